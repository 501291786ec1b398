use chrono::{Duration, NaiveDate};

use crate::{
    error::ApiError,
    models::{DailyPnl, Trade},
    services::{
        pnl_service::{self, cumulative_series, CumulativePoint, PnlStats},
        session::Session,
        trades_service,
    },
};

const RECENT_TRADES: usize = 10;

/// Inclusive calendar-date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Parses `YYYY-MM-DD` bounds; the message is meant for the user.
    pub fn parse(start: &str, end: &str) -> Result<Self, String> {
        let (start, end) = (start.trim(), end.trim());
        if start.is_empty() || end.is_empty() {
            return Err("Please select both start and end dates.".to_string());
        }

        let parse = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d");
        let (Ok(start), Ok(end)) = (parse(start), parse(end)) else {
            return Err("Please enter dates as YYYY-MM-DD.".to_string());
        };

        if start > end {
            return Err("Start date cannot be after end date.".to_string());
        }

        Ok(Self { start, end })
    }

    /// The `days` days leading up to and including `today`.
    pub fn last_days(today: NaiveDate, days: i64) -> Self {
        Self {
            start: today - Duration::days(days),
            end: today,
        }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start && day <= self.end
    }
}

/// Everything the dashboard shows for one subset of the data.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    pub filter: Option<DateRange>,
    pub stats: Option<PnlStats>,
    pub series: Vec<CumulativePoint>,
    pub recent_trades: Vec<Trade>,
    pub trade_count: usize,
}

impl DashboardSnapshot {
    pub fn compute(pnl: &[DailyPnl], trades: &[Trade], filter: Option<DateRange>) -> Self {
        let mut recent: Vec<Trade> = trades.to_vec();
        // ISO timestamps order lexicographically
        recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        recent.truncate(RECENT_TRADES);

        Self {
            filter,
            stats: PnlStats::compute(pnl),
            series: cumulative_series(pnl),
            recent_trades: recent,
            trade_count: trades.len(),
        }
    }

    pub fn has_data(&self) -> bool {
        self.stats.is_some()
    }
}

/// Loads P&L and trades once and answers date-range queries from memory.
#[derive(Debug, Default)]
pub struct DashboardAggregator {
    all_pnl: Vec<DailyPnl>,
    all_trades: Vec<Trade>,
    filter: Option<DateRange>,
    loaded: bool,
}

impl DashboardAggregator {
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn filter(&self) -> Option<DateRange> {
        self.filter
    }

    pub async fn load(&mut self, session: &mut Session) -> Result<(), ApiError> {
        let res = match pnl_service::fetch_pnl(session).await {
            Ok(pnl) => trades_service::fetch_trades(session).await.map(|t| (pnl, t)),
            Err(e) => Err(e),
        };

        match res {
            Ok((pnl, trades)) => {
                tracing::debug!(pnl = pnl.len(), trades = trades.len(), "dashboard data loaded");
                self.all_pnl = pnl;
                self.all_trades = trades;
                self.filter = None;
                self.loaded = true;
                Ok(())
            }
            Err(e) => {
                if !e.is_unauthorized() {
                    tracing::warn!("loading dashboard failed: {e}");
                    session
                        .notifier()
                        .error("Failed to load dashboard data. Please try again.");
                }
                Err(e)
            }
        }
    }

    pub fn filtered_pnl(&self, range: &DateRange) -> Vec<DailyPnl> {
        self.all_pnl
            .iter()
            .filter(|p| p.day().is_some_and(|d| range.contains(d)))
            .cloned()
            .collect()
    }

    pub fn filtered_trades(&self, range: &DateRange) -> Vec<Trade> {
        self.all_trades
            .iter()
            .filter(|t| t.trade_date().is_some_and(|d| range.contains(d)))
            .cloned()
            .collect()
    }

    /// Snapshot for the active filter, or for everything when unfiltered.
    pub fn snapshot(&self) -> DashboardSnapshot {
        match &self.filter {
            Some(range) => DashboardSnapshot::compute(
                &self.filtered_pnl(range),
                &self.filtered_trades(range),
                Some(*range),
            ),
            None => DashboardSnapshot::compute(&self.all_pnl, &self.all_trades, None),
        }
    }

    /// Restricts the view to `[start, end]` without refetching. On invalid
    /// input the current filter is kept.
    pub fn apply_filter(&mut self, start: &str, end: &str) -> Result<DashboardSnapshot, String> {
        let range = DateRange::parse(start, end)?;
        self.filter = Some(range);
        Ok(self.snapshot())
    }

    pub fn reset_filter(&mut self) -> DashboardSnapshot {
        self.filter = None;
        self.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Side;

    fn trade(ts: &str) -> Trade {
        Trade {
            symbol: "NIFTY24JAN21500CE".into(),
            underlying_symbol: "NIFTY".into(),
            option_type: "CALL".into(),
            strike_price: 21500.0,
            expiry: "2024-01-25".into(),
            price: 100.0,
            side: Side::Buy,
            timestamp: ts.into(),
        }
    }

    fn aggregator() -> DashboardAggregator {
        DashboardAggregator {
            all_pnl: vec![
                DailyPnl { date: "2023-12-29".into(), pnl: -300.0 },
                DailyPnl { date: "2024-01-01".into(), pnl: 200.0 },
                DailyPnl { date: "2024-01-31".into(), pnl: -100.0 },
                DailyPnl { date: "2024-02-01".into(), pnl: 900.0 },
            ],
            all_trades: vec![trade("2024-01-15T10:00:00"), trade("2024-02-01T00:00:00")],
            loaded: true,
            ..DashboardAggregator::default()
        }
    }

    #[test]
    fn january_range_keeps_inner_trade_only() {
        let mut agg = aggregator();
        let snap = agg.apply_filter("2024-01-01", "2024-01-31").unwrap();

        assert_eq!(snap.trade_count, 1);
        assert_eq!(snap.recent_trades[0].timestamp, "2024-01-15T10:00:00");

        let stats = snap.stats.unwrap();
        assert_eq!(stats.trading_days, 2);
        assert_eq!(stats.total, 100.0);
        assert_eq!(stats.win_rate, 50.0);
        assert_eq!(stats.avg_daily, 50.0);
    }

    #[test]
    fn start_after_end_is_rejected_and_filter_kept() {
        let mut agg = aggregator();
        agg.apply_filter("2024-01-01", "2024-01-31").unwrap();

        let err = agg.apply_filter("2024-02-10", "2024-02-01").unwrap_err();
        assert_eq!(err, "Start date cannot be after end date.");
        assert_eq!(agg.filter().map(|r| r.end), NaiveDate::from_ymd_opt(2024, 1, 31));
    }

    #[test]
    fn missing_bound_is_rejected() {
        assert!(DateRange::parse("", "2024-01-31").is_err());
    }

    #[test]
    fn reset_restores_everything() {
        let mut agg = aggregator();
        agg.apply_filter("2024-01-01", "2024-01-01").unwrap();

        let snap = agg.reset_filter();
        assert!(snap.filter.is_none());
        assert_eq!(snap.stats.unwrap().trading_days, 4);
        assert_eq!(snap.trade_count, 2);
        assert_eq!(snap.series.last().unwrap().cumulative, 700.0);
    }

    #[test]
    fn filter_with_no_days_has_no_stats() {
        let mut agg = aggregator();
        let snap = agg.apply_filter("2025-01-01", "2025-01-31").unwrap();
        assert!(!snap.has_data());
    }

    #[test]
    fn default_window_is_thirty_days_back() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let r = DateRange::last_days(today, 30);
        assert_eq!(r.start, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert!(r.contains(today));
    }
}
