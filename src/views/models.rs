//! Typed view models. Each one is the complete context of one template; the
//! templates never see backend types directly.

use handlebars::{Handlebars, RenderError};
use serde::Serialize;

use crate::{
    error::FieldErrors,
    models::{Alert, AlertType, Condition, DailyPnl, InstrumentType, OptionType, Side, Trade},
    services::{
        alerts_service::{AlertForm, BulkRow, RowRejection},
        auth_service::PasswordChecks,
        dashboard_service::{DashboardSnapshot, DateRange},
        list_service::{DailyPnlLookup, PnlSummary, TradeListing},
        notifications::ConfirmPrompt,
        pnl_service::{CumulativePoint, PnlStats},
        trades_service::TradeForm,
    },
    views::format::{self, money, pnl_class},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

fn select<I>(current: &str, items: I) -> Vec<SelectOption>
where
    I: IntoIterator<Item = (&'static str, &'static str)>,
{
    items
        .into_iter()
        .map(|(value, label)| SelectOption {
            value: value.to_string(),
            label: label.to_string(),
            selected: value == current.trim(),
        })
        .collect()
}

fn alert_type_options(current: &str) -> Vec<SelectOption> {
    select(current, AlertType::ALL.map(|t| (t.as_str(), t.label())))
}

fn condition_options(current: &str) -> Vec<SelectOption> {
    select(current, Condition::ALL.map(|c| (c.as_str(), c.label())))
}

fn option_type_options(current: &str) -> Vec<SelectOption> {
    let current = current.trim().to_uppercase();
    select(&current, [OptionType::Call, OptionType::Put].map(|o| (o.as_str(), o.as_str())))
}

// ---------------- Alerts ----------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertCard {
    pub id: i64,
    pub symbol: String,
    pub option_badge: Option<String>,
    pub is_active: bool,
    pub status_label: &'static str,
    pub toggle_label: &'static str,
    pub underlying: Option<String>,
    pub strike: Option<String>,
    pub expiry: Option<String>,
    pub alert_type: &'static str,
    pub condition: &'static str,
    pub target: String,
    pub message: Option<String>,
    pub created: String,
    pub updated: String,
}

impl From<&Alert> for AlertCard {
    fn from(a: &Alert) -> Self {
        Self {
            id: a.id,
            symbol: a.symbol.clone(),
            option_badge: a.option_type.map(|o| o.to_string()),
            is_active: a.is_active,
            status_label: if a.is_active { "Active" } else { "Inactive" },
            toggle_label: if a.is_active { "Deactivate" } else { "Activate" },
            underlying: a.underlying_symbol.clone(),
            strike: a.strike_price.map(format::plain_number),
            expiry: a.expiry.clone(),
            alert_type: a.alert_type.label(),
            condition: a.condition.label(),
            target: format::plain_number(a.target_value),
            message: Some(a.message.trim().to_string()).filter(|m| !m.is_empty()),
            created: format::stamp_date(a.created_at.as_ref()),
            updated: format::stamp_date(a.updated_at.as_ref()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertsGridView {
    pub alerts: Vec<AlertCard>,
    pub empty: bool,
}

impl AlertsGridView {
    pub fn new(alerts: &[Alert]) -> Self {
        Self {
            alerts: alerts.iter().map(AlertCard::from).collect(),
            empty: alerts.is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertFormView {
    pub id: Option<i64>,
    pub title: &'static str,
    pub submit_label: &'static str,
    pub action: String,
    pub is_option: bool,
    pub form: AlertForm,
    pub instrument_options: Vec<SelectOption>,
    pub alert_type_options: Vec<SelectOption>,
    pub condition_options: Vec<SelectOption>,
    pub option_type_options: Vec<SelectOption>,
    pub errors: FieldErrors,
}

impl AlertFormView {
    pub fn new(id: Option<i64>, form: AlertForm, errors: FieldErrors) -> Self {
        let instrument = form.instrument();
        Self {
            id,
            title: if id.is_some() { "Edit Alert" } else { "Add New Alert" },
            submit_label: if id.is_some() { "Update Alert" } else { "Create Alert" },
            action: match id {
                Some(id) => format!("/alerts/{id}"),
                None => "/alerts".to_string(),
            },
            is_option: instrument == InstrumentType::Option,
            instrument_options: select(
                instrument.as_str(),
                [
                    (InstrumentType::Option.as_str(), "Option"),
                    (InstrumentType::Stock.as_str(), "Stock"),
                ],
            ),
            alert_type_options: alert_type_options(&form.alert_type),
            condition_options: condition_options(&form.condition),
            option_type_options: option_type_options(&form.option_type),
            form,
            errors,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkRowView {
    pub number: usize,
    pub row: BulkRow,
    pub option_type_options: Vec<SelectOption>,
    pub alert_type_options: Vec<SelectOption>,
    pub condition_options: Vec<SelectOption>,
    pub problem: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkTableView {
    pub rows: Vec<BulkRowView>,
}

impl BulkTableView {
    pub fn new(rows: &[BulkRow], rejected: &[RowRejection]) -> Self {
        let rows = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let number = i + 1;
                let problem = rejected.iter().find(|r| r.row == number).map(|r| {
                    r.errors.values().cloned().collect::<Vec<_>>().join(" ")
                });
                BulkRowView {
                    number,
                    option_type_options: option_type_options(&row.option_type),
                    alert_type_options: alert_type_options(&row.alert_type),
                    condition_options: condition_options(&row.condition),
                    row: row.clone(),
                    problem,
                }
            })
            .collect();

        Self { rows }
    }
}

// ---------------- Trades & P&L ----------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRow {
    pub symbol: String,
    pub underlying: String,
    pub option_type: String,
    pub strike: String,
    pub expiry: String,
    pub price: String,
    pub side: &'static str,
    pub side_class: &'static str,
    pub timestamp: String,
    pub day: String,
}

impl From<&Trade> for TradeRow {
    fn from(t: &Trade) -> Self {
        Self {
            symbol: t.symbol.clone(),
            underlying: t.underlying_symbol.clone(),
            option_type: t.option_type.clone(),
            strike: format::plain_number(t.strike_price),
            expiry: t.expiry.clone(),
            price: format::plain_number(t.price),
            side: t.side.as_str(),
            side_class: match t.side {
                Side::Buy => "side-buy",
                Side::Sell => "side-sell",
            },
            timestamp: t.display_timestamp(),
            day: format::short_date(&t.timestamp),
        }
    }
}

/// Headline numbers shared by the dashboard and the P&L summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsView {
    pub total: String,
    pub total_class: &'static str,
    pub trend: &'static str,
    pub win_rate: String,
    pub trading_days: usize,
    pub profitable_days: usize,
    pub losing_days: usize,
    pub break_even_days: usize,
    pub avg_daily: String,
    pub avg_class: &'static str,
    pub best_date: String,
    pub best_amount: String,
    pub worst_date: String,
    pub worst_amount: String,
}

impl StatsView {
    fn new(s: &PnlStats, date_fmt: fn(&str) -> String) -> Self {
        Self {
            total: money(s.total),
            total_class: pnl_class(s.total),
            trend: if s.total >= 0.0 { "Total Profit" } else { "Total Loss" },
            win_rate: format::percent(s.win_rate),
            trading_days: s.trading_days,
            profitable_days: s.profitable_days,
            losing_days: s.losing_days,
            break_even_days: s.break_even_days,
            avg_daily: money(s.avg_daily),
            avg_class: pnl_class(s.avg_daily),
            best_date: date_fmt(&s.best_day.date),
            best_amount: money(s.best_day.pnl),
            worst_date: date_fmt(&s.worst_day.date),
            worst_amount: money(s.worst_day.pnl),
        }
    }
}

const CHART_W: f64 = 600.0;
const CHART_H: f64 = 200.0;
const CHART_PAD: f64 = 10.0;

/// Cumulative P&L as an SVG polyline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    pub width: f64,
    pub height: f64,
    pub points: String,
    pub zero_y: String,
    pub first_label: String,
    pub last_label: String,
    pub line_class: &'static str,
}

impl ChartView {
    pub fn new(series: &[CumulativePoint]) -> Option<Self> {
        let last = series.last()?;
        let first = series.first()?;

        let (mut lo, mut hi) = (0.0_f64, 0.0_f64);
        for p in series {
            lo = lo.min(p.cumulative);
            hi = hi.max(p.cumulative);
        }
        let span = hi - lo;
        let inner_w = CHART_W - 2.0 * CHART_PAD;
        let inner_h = CHART_H - 2.0 * CHART_PAD;

        let y = |v: f64| {
            if span == 0.0 {
                CHART_H / 2.0
            } else {
                CHART_PAD + (hi - v) / span * inner_h
            }
        };

        let step = if series.len() > 1 { inner_w / (series.len() - 1) as f64 } else { 0.0 };
        let points = series
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let x = if series.len() > 1 { CHART_PAD + step * i as f64 } else { CHART_W / 2.0 };
                format!("{:.1},{:.1}", x, y(p.cumulative))
            })
            .collect::<Vec<_>>()
            .join(" ");

        Some(Self {
            width: CHART_W,
            height: CHART_H,
            points,
            zero_y: format!("{:.1}", y(0.0)),
            first_label: format::short_date(&first.date),
            last_label: format::short_date(&last.date),
            line_class: pnl_class(last.cumulative),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub has_data: bool,
    pub stats: Option<StatsView>,
    pub chart: Option<ChartView>,
    pub recent_trades: Vec<TradeRow>,
    pub trade_count: usize,
    pub filter_start: String,
    pub filter_end: String,
    pub filter_label: Option<String>,
}

impl DashboardView {
    /// `default_range` pre-fills the date inputs while no filter is active.
    pub fn new(snapshot: &DashboardSnapshot, default_range: DateRange) -> Self {
        let range = snapshot.filter.unwrap_or(default_range);
        Self {
            has_data: snapshot.has_data(),
            stats: snapshot.stats.as_ref().map(|s| StatsView::new(s, format::short_date)),
            chart: ChartView::new(&snapshot.series),
            recent_trades: snapshot.recent_trades.iter().map(TradeRow::from).collect(),
            trade_count: snapshot.trade_count,
            filter_start: range.start.format("%Y-%m-%d").to_string(),
            filter_end: range.end.format("%Y-%m-%d").to_string(),
            filter_label: snapshot.filter.map(|r| {
                format!(
                    "{} to {}",
                    format::long_date(&r.start.to_string()),
                    format::long_date(&r.end.to_string())
                )
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPnlCard {
    pub label: String,
    pub amount: String,
    pub amount_class: &'static str,
    pub trend: &'static str,
}

impl DailyPnlCard {
    fn new(date: &str, lookup: &DailyPnlLookup) -> Self {
        let label = format!("Daily P&L for {}", format::long_date(date));
        match lookup {
            DailyPnlLookup::Found(p) => Self {
                label,
                amount: money(p.pnl),
                amount_class: pnl_class(p.pnl),
                trend: if p.pnl >= 0.0 { "Profit" } else { "Loss" },
            },
            DailyPnlLookup::NoData => Self {
                label,
                amount: money(0.0),
                amount_class: "pnl-neutral",
                trend: "No Data",
            },
            DailyPnlLookup::LoadFailed => Self {
                label,
                amount: "Error".to_string(),
                amount_class: "pnl-neutral",
                trend: "Error Loading",
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeListView {
    pub date: String,
    pub trades: Vec<TradeRow>,
    pub empty_message: Option<&'static str>,
    pub daily: Option<DailyPnlCard>,
}

impl From<&TradeListing> for TradeListView {
    fn from(l: &TradeListing) -> Self {
        let date = l.date.clone().unwrap_or_default();
        Self {
            trades: l.trades.iter().map(TradeRow::from).collect(),
            empty_message: l.trades.is_empty().then_some("No trades found for this date."),
            daily: l.daily.as_ref().map(|d| DailyPnlCard::new(&date, d)),
            date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PnlDayRow {
    pub date: String,
    pub amount: String,
    pub amount_class: &'static str,
    pub status: &'static str,
}

impl From<&DailyPnl> for PnlDayRow {
    fn from(p: &DailyPnl) -> Self {
        Self {
            date: format::long_date(&p.date),
            amount: money(p.pnl),
            amount_class: pnl_class(p.pnl),
            status: format::day_status(p.pnl),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PnlSummaryView {
    pub error: Option<String>,
    pub stats: Option<StatsView>,
    pub days: Vec<PnlDayRow>,
}

impl PnlSummaryView {
    pub fn new(summary: &PnlSummary) -> Self {
        Self {
            error: None,
            stats: summary.stats.as_ref().map(|s| StatsView::new(s, format::long_date)),
            days: summary.days.iter().map(PnlDayRow::from).collect(),
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            error: Some(reason.into()),
            stats: None,
            days: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeFormView {
    pub form: TradeForm,
    pub option_type_options: Vec<SelectOption>,
    pub side_options: Vec<SelectOption>,
    pub errors: FieldErrors,
}

impl TradeFormView {
    pub fn new(form: TradeForm, errors: FieldErrors) -> Self {
        let side = form.side.trim().to_uppercase();
        Self {
            option_type_options: option_type_options(&form.option_type),
            side_options: select(&side, [Side::Buy, Side::Sell].map(|s| (s.as_str(), s.as_str()))),
            form,
            errors,
        }
    }
}

// ---------------- Auth ----------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoginView {
    pub username: String,
    pub errors: FieldErrors,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisterView {
    pub username: String,
    pub email: String,
    pub checks: PasswordChecks,
    pub errors: FieldErrors,
    pub success: Option<String>,
}

impl Default for RegisterView {
    fn default() -> Self {
        Self {
            username: String::new(),
            email: String::new(),
            checks: PasswordChecks::of(""),
            errors: FieldErrors::new(),
            success: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ForgotPasswordView {
    pub email: String,
    pub errors: FieldErrors,
    pub success: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResetPasswordView {
    pub token: String,
    pub errors: FieldErrors,
    pub success: Option<String>,
}

/// Something to put on screen, plus where it goes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum View {
    AlertsGrid(AlertsGridView),
    AlertForm(AlertFormView),
    Confirm(ConfirmPrompt),
    BulkTable(BulkTableView),
    Dashboard(DashboardView),
    TradeList(TradeListView),
    PnlSummary(PnlSummaryView),
    TradeForm(TradeFormView),
    Login(LoginView),
    Register(RegisterView),
    ForgotPassword(ForgotPasswordView),
    ResetPassword(ResetPasswordView),
}

impl View {
    pub fn template(&self) -> &'static str {
        match self {
            View::AlertsGrid(_) => "partials/alerts_grid",
            View::AlertForm(_) => "partials/alert_form",
            View::Confirm(_) => "partials/confirm",
            View::BulkTable(_) => "partials/bulk_table",
            View::Dashboard(_) => "partials/dashboard_body",
            View::TradeList(_) => "partials/trade_list",
            View::PnlSummary(_) => "partials/pnl_summary",
            View::TradeForm(_) => "partials/trade_form",
            View::Login(_) => "partials/login_form",
            View::Register(_) => "partials/register_form",
            View::ForgotPassword(_) => "partials/forgot_password_form",
            View::ResetPassword(_) => "partials/reset_password_form",
        }
    }

    /// CSS selector of the element whose content the view replaces.
    pub fn target(&self) -> &'static str {
        match self {
            View::AlertsGrid(_) => "#alerts-grid",
            View::AlertForm(_) | View::Confirm(_) | View::BulkTable(_) => "#modal",
            View::Dashboard(_) => "#dashboard-body",
            View::TradeList(_) => "#trade-list",
            View::PnlSummary(_) => "#pnl-summary",
            View::TradeForm(_) => "#trade-form",
            View::Login(_) | View::Register(_) | View::ForgotPassword(_) | View::ResetPassword(_) => {
                "#auth-card"
            }
        }
    }

    /// Views that replace the list behind the modal also close it.
    pub fn closes_modal(&self) -> bool {
        matches!(self, View::AlertsGrid(_))
    }

    pub fn render(&self, hbs: &Handlebars<'_>) -> Result<String, RenderError> {
        hbs.render(self.template(), self)
    }
}
