use std::cmp::Ordering;

use reqwest::Method;
use serde::Serialize;

use crate::{
    error::ApiError,
    models::DailyPnl,
    services::session::Session,
};

/// `GET /pnl`. An empty table comes back as `null`.
pub async fn fetch_pnl(session: &mut Session) -> Result<Vec<DailyPnl>, ApiError> {
    let entries: Option<Vec<DailyPnl>> = session.call_json(Method::GET, "/pnl", &[], None).await?;
    Ok(entries.unwrap_or_default())
}

/// Aggregates over a set of daily P&L entries.
#[derive(Debug, Clone, PartialEq)]
pub struct PnlStats {
    pub total: f64,
    pub trading_days: usize,
    pub profitable_days: usize,
    pub losing_days: usize,
    pub break_even_days: usize,
    /// Percentage of profitable days, 0..=100.
    pub win_rate: f64,
    pub avg_daily: f64,
    pub best_day: DailyPnl,
    pub worst_day: DailyPnl,
}

impl PnlStats {
    /// `None` for an empty set. On ties the earliest entry in input order
    /// wins best/worst day.
    pub fn compute(entries: &[DailyPnl]) -> Option<Self> {
        let first = entries.first()?;

        let total: f64 = entries.iter().map(|p| p.pnl).sum();
        let trading_days = entries.len();
        let profitable_days = entries.iter().filter(|p| p.pnl > 0.0).count();
        let losing_days = entries.iter().filter(|p| p.pnl < 0.0).count();
        let break_even_days = entries.iter().filter(|p| p.pnl == 0.0).count();

        let mut best = first;
        let mut worst = first;
        for p in entries {
            if p.pnl > best.pnl {
                best = p;
            }
            if p.pnl < worst.pnl {
                worst = p;
            }
        }

        Some(Self {
            total,
            trading_days,
            profitable_days,
            losing_days,
            break_even_days,
            win_rate: profitable_days as f64 / trading_days as f64 * 100.0,
            avg_daily: total / trading_days as f64,
            best_day: best.clone(),
            worst_day: worst.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CumulativePoint {
    pub date: String,
    pub pnl: f64,
    pub cumulative: f64,
}

fn by_date(a: &DailyPnl, b: &DailyPnl) -> Ordering {
    match (a.day(), b.day()) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => a.date.cmp(&b.date),
    }
}

/// Running total over ascending date.
pub fn cumulative_series(entries: &[DailyPnl]) -> Vec<CumulativePoint> {
    let mut sorted: Vec<&DailyPnl> = entries.iter().collect();
    sorted.sort_by(|a, b| by_date(a, b));

    let mut running = 0.0;
    sorted
        .into_iter()
        .map(|p| {
            running += p.pnl;
            CumulativePoint {
                date: p.date.clone(),
                pnl: p.pnl,
                cumulative: running,
            }
        })
        .collect()
}

/// Newest day first.
pub fn newest_first(entries: &[DailyPnl]) -> Vec<DailyPnl> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| by_date(b, a));
    sorted
}

#[derive(Debug, Default)]
pub struct PnlManager {
    entries: Vec<DailyPnl>,
}

impl PnlManager {
    pub fn entries(&self) -> &[DailyPnl] {
        &self.entries
    }

    pub async fn list(&mut self, session: &mut Session) -> Result<(), ApiError> {
        let res = fetch_pnl(session).await;

        match res {
            Ok(entries) => {
                tracing::debug!(count = entries.len(), "pnl loaded");
                self.entries = entries;
                Ok(())
            }
            Err(e) => {
                if !e.is_unauthorized() {
                    tracing::warn!("loading pnl failed: {e}");
                }
                Err(e)
            }
        }
    }

    pub fn for_date(&self, date: &str) -> Option<&DailyPnl> {
        self.entries.iter().find(|p| p.date == date)
    }

    /// Statistics over the full, unfiltered set.
    pub fn summary(&self) -> Option<PnlStats> {
        PnlStats::compute(&self.entries)
    }
}
