pub mod alert;
pub mod auth;
pub mod pnl;
pub mod trade;

pub use alert::{Alert, AlertRequest, AlertType, Condition, InstrumentType, OptionType};
pub use pnl::DailyPnl;
pub use trade::{Side, Trade, TradeRequest};
