use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "SELL")]
    Sell,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }

    pub fn parse(s: &str) -> Option<Side> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Some(Side::Buy),
            "SELL" => Some(Side::Sell),
            _ => None,
        }
    }
}

/// A recorded option trade. Trades are never edited or deleted from the panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub symbol: String,
    #[serde(default)]
    pub underlying_symbol: String,
    #[serde(default)]
    pub option_type: String,
    #[serde(default)]
    pub strike_price: f64,
    #[serde(default)]
    pub expiry: String,
    pub price: f64,
    pub side: Side,

    // kept as sent by the server; date filters work on its textual prefix
    #[serde(default)]
    pub timestamp: String,
}

impl Trade {
    /// Calendar date part of the timestamp (`YYYY-MM-DD` before the `T`).
    pub fn trade_date(&self) -> Option<NaiveDate> {
        let day = self.timestamp.split('T').next()?;
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }

    /// `2024-01-15T10:00:00.123Z` -> `2024-01-15 10:00:00`
    pub fn display_timestamp(&self) -> String {
        self.timestamp.replacen('T', " ", 1).chars().take(19).collect()
    }
}

/// Body of `POST /stocks`. The server stamps the timestamp itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRequest {
    pub symbol: String,
    pub underlying_symbol: String,
    pub option_type: String,
    pub strike_price: f64,
    pub expiry: String,
    pub price: f64,
    pub side: Side,
}
