use crate::{
    error::ApiError,
    models::{DailyPnl, Trade},
    services::{
        pnl_service::{newest_first, PnlManager, PnlStats},
        session::Session,
        trades_service::TradeManager,
    },
};

/// P&L card shown next to the trade list for the selected date.
#[derive(Debug, Clone, PartialEq)]
pub enum DailyPnlLookup {
    Found(DailyPnl),
    NoData,
    LoadFailed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeListing {
    pub date: Option<String>,
    pub trades: Vec<Trade>,
    pub daily: Option<DailyPnlLookup>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PnlSummary {
    pub stats: Option<PnlStats>,
    pub days: Vec<DailyPnl>,
}

/// Backs the trade list page: trades by day plus the P&L summary.
#[derive(Debug, Default)]
pub struct ListViewer {
    pub trades: TradeManager,
    pub pnl: PnlManager,
}

impl ListViewer {
    /// Fetches trades and keeps those on `date` (all when blank). With a date
    /// the day's P&L is fetched as well; its failure only marks the card.
    pub async fn load_trades(
        &mut self,
        session: &mut Session,
        date: Option<&str>,
    ) -> Result<TradeListing, ApiError> {
        let date = date.map(str::trim).filter(|d| !d.is_empty());

        self.trades.list(session).await?;
        let trades: Vec<Trade> = self
            .trades
            .on_date(date.unwrap_or(""))
            .into_iter()
            .cloned()
            .collect();

        let daily = match date {
            Some(d) => Some(match self.pnl.list(session).await {
                Ok(()) => self
                    .pnl
                    .for_date(d)
                    .cloned()
                    .map(DailyPnlLookup::Found)
                    .unwrap_or(DailyPnlLookup::NoData),
                Err(ApiError::Unauthorized) => return Err(ApiError::Unauthorized),
                Err(_) => DailyPnlLookup::LoadFailed,
            }),
            None => None,
        };

        Ok(TradeListing {
            date: date.map(str::to_string),
            trades,
            daily,
        })
    }

    /// Summary over every recorded day, listed newest first.
    pub async fn pnl_summary(&mut self, session: &mut Session) -> Result<PnlSummary, ApiError> {
        self.pnl.list(session).await?;

        Ok(PnlSummary {
            stats: self.pnl.summary(),
            days: newest_first(self.pnl.entries()),
        })
    }
}
