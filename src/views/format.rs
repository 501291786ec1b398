use chrono::{DateTime, NaiveDate, Utc};

pub fn money(v: f64) -> String {
    format!("₹{v:.2}")
}

pub fn percent(v: f64) -> String {
    format!("{v:.1}%")
}

/// CSS class for a signed amount; zero counts as profit.
pub fn pnl_class(v: f64) -> &'static str {
    if v >= 0.0 { "pnl-positive" } else { "pnl-negative" }
}

pub fn day_status(v: f64) -> &'static str {
    if v > 0.0 {
        "Profit"
    } else if v < 0.0 {
        "Loss"
    } else {
        "Break Even"
    }
}

fn parse_day(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date.get(..10)?, "%Y-%m-%d").ok()
}

/// `2024-01-15` -> `Jan 15`. Unparseable input is returned as is.
pub fn short_date(date: &str) -> String {
    parse_day(date)
        .map(|d| d.format("%b %-d").to_string())
        .unwrap_or_else(|| date.to_string())
}

/// `2024-01-15` -> `Mon, Jan 15, 2024`.
pub fn long_date(date: &str) -> String {
    parse_day(date)
        .map(|d| d.format("%a, %b %-d, %Y").to_string())
        .unwrap_or_else(|| date.to_string())
}

pub fn stamp_date(ts: Option<&DateTime<Utc>>) -> String {
    ts.map(|t| t.format("%-m/%-d/%Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Prices as the backend sent them, without trailing zeros: `2500`, `50.5`.
pub fn plain_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}
