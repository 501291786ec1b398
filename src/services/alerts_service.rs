use chrono::NaiveDate;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiError, FieldErrors},
    models::{
        alert::{AlertEnvelope, AlertsEnvelope},
        Alert, AlertRequest, AlertType, Condition, InstrumentType, OptionType,
    },
    services::session::Session,
};

/// Raw alert form as posted by the browser. Every field is text until
/// [`AlertForm::to_request`] validates it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertForm {
    #[serde(rename = "instrumentType")]
    pub instrument_type: String,
    pub symbol: String,
    #[serde(rename = "underlyingSymbol")]
    pub underlying_symbol: String,
    #[serde(rename = "optionType")]
    pub option_type: String,
    #[serde(rename = "strikePrice")]
    pub strike_price: String,
    pub expiry: String,
    #[serde(rename = "alertType")]
    pub alert_type: String,
    #[serde(rename = "targetValue")]
    pub target_value: String,
    pub condition: String,
    pub message: String,
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

impl AlertForm {
    /// Blank form for "Add New Alert"; options are the default instrument.
    pub fn blank() -> Self {
        Self {
            instrument_type: InstrumentType::Option.as_str().to_string(),
            ..Self::default()
        }
    }

    pub fn from_alert(a: &Alert) -> Self {
        let instrument = if a.is_option() { InstrumentType::Option } else { InstrumentType::Stock };

        Self {
            instrument_type: instrument.as_str().to_string(),
            symbol: a.symbol.clone(),
            underlying_symbol: a.underlying_symbol.clone().unwrap_or_default(),
            option_type: a.option_type.map(|o| o.as_str().to_string()).unwrap_or_default(),
            strike_price: a.strike_price.map(|s| s.to_string()).unwrap_or_default(),
            expiry: a.expiry.clone().unwrap_or_default(),
            alert_type: a.alert_type.as_str().to_string(),
            target_value: a.target_value.to_string(),
            condition: a.condition.as_str().to_string(),
            message: a.message.clone(),
        }
    }

    pub fn instrument(&self) -> InstrumentType {
        InstrumentType::parse(&self.instrument_type)
    }

    /// Validates the form and builds the request body. Option fields are
    /// required, and sent, only for option alerts.
    pub fn to_request(&self) -> Result<AlertRequest, FieldErrors> {
        let mut errors = FieldErrors::new();

        let symbol = self.symbol.trim().to_string();
        if symbol.is_empty() {
            errors.insert("symbol".into(), "Symbol is required.".into());
        }

        let alert_type = if self.alert_type.trim().is_empty() {
            errors.insert("alertType".into(), "Alert type is required.".into());
            None
        } else {
            let parsed = self.alert_type.parse::<AlertType>().ok();
            if parsed.is_none() {
                errors.insert("alertType".into(), "Unknown alert type.".into());
            }
            parsed
        };

        let condition = if self.condition.trim().is_empty() {
            errors.insert("condition".into(), "Condition is required.".into());
            None
        } else {
            let parsed = self.condition.parse::<Condition>().ok();
            if parsed.is_none() {
                errors.insert("condition".into(), "Unknown condition.".into());
            }
            parsed
        };

        let target_value = parse_number(&self.target_value);
        if target_value.is_none() {
            errors.insert("targetValue".into(), "Target value must be a number.".into());
        }

        let mut option_fields = (None, None, None, None);
        if self.instrument() == InstrumentType::Option {
            let underlying = self.underlying_symbol.trim();
            if underlying.is_empty() {
                errors.insert("underlyingSymbol".into(), "Underlying symbol is required for options.".into());
            }

            let option_type = self.option_type.parse::<OptionType>().ok();
            if option_type.is_none() {
                errors.insert("optionType".into(), "Choose CALL or PUT.".into());
            }

            let strike = parse_number(&self.strike_price);
            if strike.is_none() {
                errors.insert("strikePrice".into(), "Strike price must be a number.".into());
            }

            let expiry = self.expiry.trim();
            if NaiveDate::parse_from_str(expiry, "%Y-%m-%d").is_err() {
                errors.insert("expiry".into(), "Expiry date is required.".into());
            }

            option_fields = (
                Some(underlying.to_string()),
                option_type,
                strike,
                Some(expiry.to_string()),
            );
        }

        match (alert_type, condition, target_value) {
            (Some(alert_type), Some(condition), Some(target_value)) if errors.is_empty() => {
                let (underlying_symbol, option_type, strike_price, expiry) = option_fields;
                Ok(AlertRequest {
                    symbol,
                    underlying_symbol,
                    option_type,
                    strike_price,
                    expiry,
                    alert_type,
                    target_value,
                    condition,
                    message: self.message.trim().to_string(),
                })
            }
            _ => Err(errors),
        }
    }
}

/// One row of the bulk-create table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkRow {
    pub symbol: String,
    pub underlying: String,
    #[serde(rename = "optionType")]
    pub option_type: String,
    pub strike: String,
    pub expiry: String,
    #[serde(rename = "alertType")]
    pub alert_type: String,
    pub target: String,
    pub condition: String,
    pub message: String,
}

impl BulkRow {
    /// A row with an underlying symbol is an option row, otherwise a stock row.
    pub fn to_form(&self) -> AlertForm {
        let instrument = if self.underlying.trim().is_empty() {
            InstrumentType::Stock
        } else {
            InstrumentType::Option
        };

        AlertForm {
            instrument_type: instrument.as_str().to_string(),
            symbol: self.symbol.clone(),
            underlying_symbol: self.underlying.clone(),
            option_type: self.option_type.clone(),
            strike_price: self.strike.clone(),
            expiry: self.expiry.clone(),
            alert_type: self.alert_type.clone(),
            target_value: self.target.clone(),
            condition: self.condition.clone(),
            message: self.message.clone(),
        }
    }

    /// Nothing typed into the free-text cells; selects keep their defaults.
    pub fn is_blank(&self) -> bool {
        [&self.symbol, &self.underlying, &self.strike, &self.expiry, &self.target, &self.message]
            .iter()
            .all(|s| s.trim().is_empty())
    }

    pub fn empty() -> Self {
        Self {
            option_type: OptionType::Call.as_str().to_string(),
            alert_type: AlertType::PriceAbove.as_str().to_string(),
            condition: Condition::Gt.as_str().to_string(),
            ..Self::default()
        }
    }

    pub fn samples() -> Vec<BulkRow> {
        let row = |symbol: &str, underlying: &str, opt: &str, strike: &str, kind: &str, target: &str, cond: &str, msg: &str| BulkRow {
            symbol: symbol.into(),
            underlying: underlying.into(),
            option_type: opt.into(),
            strike: strike.into(),
            expiry: "2024-01-25".into(),
            alert_type: kind.into(),
            target: target.into(),
            condition: cond.into(),
            message: msg.into(),
        };

        vec![
            row("RELIANCE24JAN2500CE", "RELIANCE", "CALL", "2500", "PRICE_ABOVE", "50", ">", "RELIANCE Call above 50"),
            row("RELIANCE24JAN2400PE", "RELIANCE", "PUT", "2400", "PRICE_ABOVE", "30", ">", "RELIANCE Put above 30"),
            row("TCS24JAN4000CE", "TCS", "CALL", "4000", "PRICE_BELOW", "20", "<", "TCS Call below 20"),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowRejection {
    /// 1-based, as the user sees the table.
    pub row: usize,
    pub errors: FieldErrors,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkReport {
    pub rejected: Vec<RowRejection>,
    pub created: usize,
    pub failed: usize,
}

impl BulkReport {
    pub fn attempted(&self) -> usize {
        self.created + self.failed
    }
}

#[derive(Debug)]
pub enum SaveError {
    Invalid(FieldErrors),
    Api(ApiError),
}

/// Owns the alert list of one workspace and keeps it in sync with the
/// backend. Every successful mutation is followed by a full reload.
#[derive(Debug, Default)]
pub struct AlertManager {
    alerts: Vec<Alert>,
}

impl AlertManager {
    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn find(&self, id: i64) -> Option<&Alert> {
        self.alerts.iter().find(|a| a.id == id)
    }

    pub async fn list(&mut self, session: &mut Session) -> Result<(), ApiError> {
        let res = session
            .call_json::<AlertsEnvelope>(Method::GET, "/alerts", &[], None)
            .await;

        match res {
            Ok(env) => {
                tracing::debug!(count = env.alerts.len(), "alerts loaded");
                self.alerts = env.alerts;
                Ok(())
            }
            Err(e) => {
                if !e.is_unauthorized() {
                    tracing::warn!("loading alerts failed: {e}");
                    session.notifier().error("Failed to load alerts. Please try again.");
                }
                Err(e)
            }
        }
    }

    async fn post_alert(
        session: &mut Session,
        id: Option<i64>,
        req: &AlertRequest,
    ) -> Result<AlertEnvelope, ApiError> {
        let body = serde_json::to_value(req).map_err(|e| ApiError::Decode(e.to_string()))?;

        match id {
            Some(id) => {
                session
                    .call_json(Method::PUT, "/alerts", &[("id", id.to_string())], Some(body))
                    .await
            }
            None => session.call_json(Method::POST, "/alerts", &[], Some(body)).await,
        }
    }

    /// Create (`id == None`) or update an alert from the submitted form.
    /// Invalid forms never reach the network.
    pub async fn save(
        &mut self,
        session: &mut Session,
        id: Option<i64>,
        form: &AlertForm,
    ) -> Result<(), SaveError> {
        let req = form.to_request().map_err(SaveError::Invalid)?;

        let res = Self::post_alert(session, id, &req).await;

        match res {
            Ok(env) => {
                let fallback = if id.is_some() { "Alert updated successfully" } else { "Alert created successfully" };
                let msg = if env.message.is_empty() { fallback.to_string() } else { env.message };
                tracing::info!(symbol = %req.symbol, ?id, "alert saved");
                session.notifier().success(msg);

                let _ = self.list(session).await;
                Ok(())
            }
            Err(e) => {
                if !e.is_unauthorized() {
                    tracing::warn!(symbol = %req.symbol, "saving alert failed: {e}");
                    session
                        .notifier()
                        .error(e.user_message("Failed to save alert. Please try again."));
                }
                Err(SaveError::Api(e))
            }
        }
    }

    /// Deletes an alert known to this workspace. Unknown ids are ignored and
    /// return `Ok(false)` without a request.
    pub async fn delete(&mut self, session: &mut Session, id: i64) -> Result<bool, ApiError> {
        if self.find(id).is_none() {
            return Ok(false);
        }

        let res = session
            .call_json::<AlertEnvelope>(Method::DELETE, "/alerts", &[("id", id.to_string())], None)
            .await;

        match res {
            Ok(env) => {
                let msg = if env.message.is_empty() { "Alert deleted successfully".to_string() } else { env.message };
                session.notifier().success(msg);
                let _ = self.list(session).await;
                Ok(true)
            }
            Err(e) => {
                if !e.is_unauthorized() {
                    tracing::warn!(id, "deleting alert failed: {e}");
                    session
                        .notifier()
                        .error(e.user_message("Failed to delete alert. Please try again."));
                }
                Err(e)
            }
        }
    }

    /// Flips `is_active` on the server. The local list only changes through
    /// the reload that follows.
    pub async fn toggle_active(&mut self, session: &mut Session, id: i64) -> Result<(), ApiError> {
        let res = session
            .call_json::<AlertEnvelope>(Method::PATCH, "/alerts/toggle", &[("id", id.to_string())], None)
            .await;

        match res {
            Ok(env) => {
                let msg = if env.message.is_empty() { "Alert status updated successfully".to_string() } else { env.message };
                session.notifier().success(msg);
                let _ = self.list(session).await;
                Ok(())
            }
            Err(e) => {
                if !e.is_unauthorized() {
                    tracing::warn!(id, "toggling alert failed: {e}");
                    session
                        .notifier()
                        .error(e.user_message("Failed to update alert status. Please try again."));
                }
                Err(e)
            }
        }
    }

    /// Validates every row on its own, then creates the valid ones one after
    /// another. A failing row does not stop the rest; a 401 does.
    pub async fn bulk_create(&mut self, session: &mut Session, rows: &[BulkRow]) -> BulkReport {
        let mut report = BulkReport::default();

        if rows.is_empty() {
            session.notifier().error("Please add at least one alert row.");
            return report;
        }

        let mut valid = Vec::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            match row.to_form().to_request() {
                Ok(req) => valid.push(req),
                Err(errors) => report.rejected.push(RowRejection { row: idx + 1, errors }),
            }
        }

        if !report.rejected.is_empty() {
            let lines: Vec<String> = report
                .rejected
                .iter()
                .map(|r| format!("Row {}: Missing or invalid fields ({})", r.row, r.errors.keys().cloned().collect::<Vec<_>>().join(", ")))
                .collect();
            session
                .notifier()
                .error(format!("Validation errors:\n{}", lines.join("\n")));
        }

        for req in &valid {
            match Self::post_alert(session, None, req).await {
                Ok(_) => report.created += 1,
                Err(ApiError::Unauthorized) => {
                    report.failed += 1;
                    break;
                }
                Err(e) => {
                    tracing::warn!(symbol = %req.symbol, "bulk row failed: {e}");
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            created = report.created,
            failed = report.failed,
            rejected = report.rejected.len(),
            "bulk create finished"
        );

        if report.created > 0 {
            let mut msg = format!("Successfully created {} alerts", report.created);
            if report.failed > 0 {
                msg.push_str(&format!(", {} failed", report.failed));
            }
            session.notifier().success(msg);
            let _ = self.list(session).await;
        } else if report.attempted() > 0 && session.is_authenticated() {
            session.notifier().error("Failed to create any alerts");
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option_form() -> AlertForm {
        AlertForm {
            instrument_type: "OPTION".into(),
            symbol: "RELIANCE24JAN2500CE".into(),
            underlying_symbol: "RELIANCE".into(),
            option_type: "CALL".into(),
            strike_price: "2500".into(),
            expiry: "2024-01-25".into(),
            alert_type: "PRICE_ABOVE".into(),
            target_value: "50".into(),
            condition: ">".into(),
            message: " call above 50 ".into(),
        }
    }

    #[test]
    fn option_form_carries_option_fields() {
        let req = option_form().to_request().unwrap();
        assert_eq!(req.option_type, Some(OptionType::Call));
        assert_eq!(req.strike_price, Some(2500.0));
        assert_eq!(req.expiry.as_deref(), Some("2024-01-25"));
        assert_eq!(req.message, "call above 50");
    }

    #[test]
    fn stock_form_drops_option_fields_even_if_filled() {
        let mut form = option_form();
        form.instrument_type = "STOCK".into();

        let req = form.to_request().unwrap();
        let v = serde_json::to_value(&req).unwrap();
        for key in ["underlying_symbol", "option_type", "strike_price", "expiry"] {
            assert!(v.get(key).is_none(), "{key} must be omitted for stock alerts");
        }
    }

    #[test]
    fn option_fields_only_required_for_options() {
        let mut form = option_form();
        form.underlying_symbol.clear();
        form.strike_price = "abc".into();
        form.expiry.clear();

        let errs = form.to_request().unwrap_err();
        assert!(errs.contains_key("underlyingSymbol"));
        assert!(errs.contains_key("strikePrice"));
        assert!(errs.contains_key("expiry"));

        form.instrument_type = "STOCK".into();
        assert!(form.to_request().is_ok());
    }

    #[test]
    fn required_fields_are_reported_together() {
        let form = AlertForm { instrument_type: "STOCK".into(), ..AlertForm::default() };
        let errs = form.to_request().unwrap_err();
        assert!(errs.contains_key("symbol"));
        assert!(errs.contains_key("alertType"));
        assert!(errs.contains_key("condition"));
        assert!(errs.contains_key("targetValue"));
    }

    #[test]
    fn edit_form_round_trips_alert() {
        let alert = Alert {
            id: 3,
            symbol: "INFY".into(),
            underlying_symbol: None,
            option_type: None,
            strike_price: None,
            expiry: None,
            alert_type: AlertType::PriceBelow,
            target_value: 1400.5,
            condition: Condition::Lte,
            message: "dip".into(),
            is_active: true,
            created_at: None,
            updated_at: None,
            user_id: 1,
        };

        let form = AlertForm::from_alert(&alert);
        assert_eq!(form.instrument(), InstrumentType::Stock);
        assert_eq!(form.condition, "<=");

        let req = form.to_request().unwrap();
        assert_eq!(req.target_value, 1400.5);
        assert_eq!(req.option_type, None);
    }

    #[test]
    fn bulk_row_without_underlying_is_a_stock_alert() {
        let row = BulkRow {
            symbol: "TCS".into(),
            target: "4000".into(),
            ..BulkRow::empty()
        };
        let req = row.to_form().to_request().unwrap();
        assert_eq!(req.option_type, None);
        assert_eq!(req.alert_type, AlertType::PriceAbove);
    }

    #[test]
    fn sample_rows_are_all_valid() {
        for row in BulkRow::samples() {
            assert!(row.to_form().to_request().is_ok(), "{row:?}");
        }
    }
}
