use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiError, FieldErrors},
    models::{OptionType, Side, Trade, TradeRequest},
    services::{alerts_service::SaveError, session::Session},
};

/// `GET /stocks`. The backend encodes an empty table as `null`.
pub async fn fetch_trades(session: &mut Session) -> Result<Vec<Trade>, ApiError> {
    let trades: Option<Vec<Trade>> = session.call_json(Method::GET, "/stocks", &[], None).await?;
    Ok(trades.unwrap_or_default())
}

/// Trades whose timestamp starts with `date` (`YYYY-MM-DD`). A blank date
/// keeps everything.
pub fn filter_by_date_prefix<'a>(trades: &'a [Trade], date: &str) -> Vec<&'a Trade> {
    let date = date.trim();
    trades
        .iter()
        .filter(|t| date.is_empty() || t.timestamp.starts_with(date))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeForm {
    pub symbol: String,
    pub underlying_symbol: String,
    pub option_type: String,
    pub strike_price: String,
    pub expiry: String,
    pub price: String,
    pub side: String,
}

impl TradeForm {
    pub fn to_request(&self) -> Result<TradeRequest, FieldErrors> {
        let mut errors = FieldErrors::new();

        let symbol = self.symbol.trim();
        if symbol.is_empty() {
            errors.insert("symbol".into(), "Symbol is required.".into());
        }

        let option_type = self.option_type.parse::<OptionType>().ok();
        if option_type.is_none() {
            errors.insert("option_type".into(), "Choose CALL or PUT.".into());
        }

        // the backend stores a blank strike as 0
        let strike_price = match self.strike_price.trim() {
            "" => Some(0.0),
            s => s.parse::<f64>().ok().filter(|v| v.is_finite()),
        };
        if strike_price.is_none() {
            errors.insert("strike_price".into(), "Strike price must be a number.".into());
        }

        let price = self.price.trim().parse::<f64>().ok().filter(|v| v.is_finite());
        if price.is_none() {
            errors.insert("price".into(), "Price must be a number.".into());
        }

        let side = Side::parse(&self.side);
        if side.is_none() {
            errors.insert("side".into(), "Choose BUY or SELL.".into());
        }

        match (option_type, strike_price, price, side) {
            (Some(option_type), Some(strike_price), Some(price), Some(side)) if errors.is_empty() => Ok(TradeRequest {
                symbol: symbol.to_string(),
                underlying_symbol: self.underlying_symbol.trim().to_string(),
                option_type: option_type.as_str().to_string(),
                strike_price,
                expiry: self.expiry.trim().to_string(),
                price,
                side,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Default)]
pub struct TradeManager {
    trades: Vec<Trade>,
}

impl TradeManager {
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub async fn list(&mut self, session: &mut Session) -> Result<(), ApiError> {
        let res = fetch_trades(session).await;

        match res {
            Ok(trades) => {
                tracing::debug!(count = trades.len(), "trades loaded");
                self.trades = trades;
                Ok(())
            }
            Err(e) => {
                if !e.is_unauthorized() {
                    tracing::warn!("loading trades failed: {e}");
                }
                Err(e)
            }
        }
    }

    pub fn on_date(&self, date: &str) -> Vec<&Trade> {
        filter_by_date_prefix(&self.trades, date)
    }

    /// `POST /stocks`; the server answers 201 with no body.
    pub async fn create(&mut self, session: &mut Session, form: &TradeForm) -> Result<(), SaveError> {
        let req = form.to_request().map_err(SaveError::Invalid)?;
        let body = serde_json::to_value(&req).map_err(|e| SaveError::Api(ApiError::Decode(e.to_string())))?;

        let res = session.call(Method::POST, "/stocks", &[], Some(body)).await;

        match res {
            Ok(_) => {
                tracing::info!(symbol = %req.symbol, side = req.side.as_str(), "trade recorded");
                session.notifier().success("Submitted successfully!");
                Ok(())
            }
            Err(e) => {
                if !e.is_unauthorized() {
                    tracing::warn!(symbol = %req.symbol, "recording trade failed: {e}");
                    session.notifier().error(format!("Error: {}", e.user_message("could not record trade")));
                }
                Err(SaveError::Api(e))
            }
        }
    }
}
