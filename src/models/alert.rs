use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertType {
    #[serde(rename = "PRICE_ABOVE")]
    PriceAbove,
    #[serde(rename = "PRICE_BELOW")]
    PriceBelow,
    #[serde(rename = "PERCENTAGE_CHANGE")]
    PercentageChange,
}

impl AlertType {
    pub const ALL: [AlertType; 3] = [
        AlertType::PriceAbove,
        AlertType::PriceBelow,
        AlertType::PercentageChange,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AlertType::PriceAbove => "PRICE_ABOVE",
            AlertType::PriceBelow => "PRICE_BELOW",
            AlertType::PercentageChange => "PERCENTAGE_CHANGE",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AlertType::PriceAbove => "Price Above",
            AlertType::PriceBelow => "Price Below",
            AlertType::PercentageChange => "Percentage Change",
        }
    }
}

impl FromStr for AlertType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AlertType::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or(())
    }
}

/// Comparison operator the backend applies between price and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = "==")]
    Eq,
}

impl Condition {
    pub const ALL: [Condition; 5] = [
        Condition::Gt,
        Condition::Lt,
        Condition::Gte,
        Condition::Lte,
        Condition::Eq,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Condition::Gt => ">",
            Condition::Lt => "<",
            Condition::Gte => ">=",
            Condition::Lte => "<=",
            Condition::Eq => "==",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Condition::Gt => "Greater than",
            Condition::Lt => "Less than",
            Condition::Gte => "Greater than or equal to",
            Condition::Lte => "Less than or equal to",
            Condition::Eq => "Equal to",
        }
    }
}

impl FromStr for Condition {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Condition::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim())
            .ok_or(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionType {
    #[serde(rename = "CALL")]
    Call,
    #[serde(rename = "PUT")]
    Put,
}

impl OptionType {
    pub fn as_str(self) -> &'static str {
        match self {
            OptionType::Call => "CALL",
            OptionType::Put => "PUT",
        }
    }
}

impl FromStr for OptionType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CALL" => Ok(OptionType::Call),
            "PUT" => Ok(OptionType::Put),
            _ => Err(()),
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstrumentType {
    Stock,
    #[default]
    Option,
}

impl InstrumentType {
    pub fn as_str(self) -> &'static str {
        match self {
            InstrumentType::Stock => "STOCK",
            InstrumentType::Option => "OPTION",
        }
    }

    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("STOCK") {
            InstrumentType::Stock
        } else {
            InstrumentType::Option
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: i64,
    pub symbol: String,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "empty_as_none")]
    pub underlying_symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "option_type_or_none")]
    pub option_type: Option<OptionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strike_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "empty_as_none")]
    pub expiry: Option<String>,

    pub alert_type: AlertType,
    pub target_value: f64,
    pub condition: Condition,

    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub is_active: bool,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub user_id: i64,
}

impl Alert {
    pub fn is_option(&self) -> bool {
        self.option_type.is_some()
    }
}

/// Body of `POST /alerts` and `PUT /alerts?id=`.
///
/// The option fields are only serialized for option alerts; a stock alert
/// must not carry them at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRequest {
    pub symbol: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub underlying_symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_type: Option<OptionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strike_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,

    pub alert_type: AlertType,
    pub target_value: f64,
    pub condition: Condition,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlertsEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub alert: Option<Alert>,
}

fn empty_as_none<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(d)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}

// Rows written before options support carry option_type "" instead of omitting it.
fn option_type_or_none<'de, D>(d: D) -> Result<Option<OptionType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(d)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

pub(crate) fn null_as_empty<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(d)?.unwrap_or_default())
}
