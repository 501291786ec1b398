use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Realised profit or loss for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPnl {
    pub date: String,
    pub pnl: f64,
}

impl DailyPnl {
    pub fn day(&self) -> Option<NaiveDate> {
        let day = self.date.get(..10).unwrap_or(&self.date);
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }
}
