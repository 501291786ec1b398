//! User actions as data. Controllers translate requests into an [`Action`],
//! [`dispatch`] runs it against a workspace and returns what the browser
//! should see next.

use chrono::NaiveDate;

use crate::{
    error::ApiError,
    services::{
        alerts_service::{AlertForm, BulkRow, SaveError},
        auth_service::{self, PasswordChecks, RegisterForm, HOME_PATH},
        dashboard_service::{DashboardSnapshot, DateRange},
        notifications::{ConfirmPrompt, Toast},
        trades_service::TradeForm,
        workspace::Workspace,
    },
    views::models::{
        AlertFormView, AlertsGridView, BulkTableView, DashboardView, ForgotPasswordView,
        LoginView, PnlSummaryView, RegisterView, ResetPasswordView, TradeFormView,
        TradeListView, View,
    },
};

/// Days covered by the dashboard's pre-filled date filter.
pub const DEFAULT_FILTER_DAYS: i64 = 30;

pub const ALERTS_CHANGED: &str = "alertsChanged";
pub const TRADES_CHANGED: &str = "tradesChanged";

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    LoadAlerts,
    NewAlert,
    EditAlert(i64),
    SubmitAlert { id: Option<i64>, form: AlertForm },
    DeleteAlert { id: i64, confirmed: bool },
    ToggleAlert(i64),
    OpenBulk,
    AddBulkRow(Vec<BulkRow>),
    SampleBulkRows,
    BulkCreate(Vec<BulkRow>),

    LoadDashboard { today: NaiveDate },
    ApplyDateFilter { start: String, end: String, today: NaiveDate },
    ResetDateFilter { today: NaiveDate },

    LoadTrades { date: Option<String> },
    ShowPnlSummary,
    NewTrade,
    SubmitTrade(TradeForm),

    VerifyToken,
    Login { username: String, password: String },
    ShowRegister,
    Register(RegisterForm),
    Logout,
    ShowForgotPassword,
    ForgotPassword { email: String },
    ShowResetPassword { token: String },
    ResetPassword { token: String, password: String, confirm: String },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::LoadAlerts => "load_alerts",
            Action::NewAlert => "new_alert",
            Action::EditAlert(_) => "edit_alert",
            Action::SubmitAlert { .. } => "submit_alert",
            Action::DeleteAlert { .. } => "delete_alert",
            Action::ToggleAlert(_) => "toggle_alert",
            Action::OpenBulk => "open_bulk",
            Action::AddBulkRow(_) => "add_bulk_row",
            Action::SampleBulkRows => "sample_bulk_rows",
            Action::BulkCreate(_) => "bulk_create",
            Action::LoadDashboard { .. } => "load_dashboard",
            Action::ApplyDateFilter { .. } => "apply_date_filter",
            Action::ResetDateFilter { .. } => "reset_date_filter",
            Action::LoadTrades { .. } => "load_trades",
            Action::ShowPnlSummary => "show_pnl_summary",
            Action::NewTrade => "new_trade",
            Action::SubmitTrade(_) => "submit_trade",
            Action::VerifyToken => "verify_token",
            Action::Login { .. } => "login",
            Action::ShowRegister => "show_register",
            Action::Register(_) => "register",
            Action::Logout => "logout",
            Action::ShowForgotPassword => "show_forgot_password",
            Action::ForgotPassword { .. } => "forgot_password",
            Action::ShowResetPassword { .. } => "show_reset_password",
            Action::ResetPassword { .. } => "reset_password",
        }
    }
}

/// Result of one action. A redirect wins over the view.
#[derive(Debug, Default)]
pub struct Outcome {
    pub view: Option<View>,
    pub redirect: Option<String>,
    pub toasts: Vec<Toast>,
    /// Names sent to the browser as `HX-Trigger` events.
    pub events: Vec<&'static str>,
}

struct Step {
    view: Option<View>,
    events: Vec<&'static str>,
}

impl Step {
    fn none() -> Self {
        Self { view: None, events: Vec::new() }
    }

    fn show(view: View) -> Self {
        Self { view: Some(view), events: Vec::new() }
    }

    fn with_event(mut self, event: &'static str) -> Self {
        self.events.push(event);
        self
    }
}

pub async fn dispatch(ws: &mut Workspace, action: Action) -> Outcome {
    let name = action.name();
    tracing::debug!(action = name, "dispatch");

    let step = match action {
        Action::LoadAlerts
        | Action::NewAlert
        | Action::EditAlert(_)
        | Action::SubmitAlert { .. }
        | Action::DeleteAlert { .. }
        | Action::ToggleAlert(_)
        | Action::OpenBulk
        | Action::AddBulkRow(_)
        | Action::SampleBulkRows
        | Action::BulkCreate(_) => alerts(ws, action).await,

        Action::LoadDashboard { .. } | Action::ApplyDateFilter { .. } | Action::ResetDateFilter { .. } => {
            dashboard(ws, action).await
        }

        Action::LoadTrades { .. } | Action::ShowPnlSummary | Action::NewTrade | Action::SubmitTrade(_) => {
            trades(ws, action).await
        }

        _ => auth(ws, action).await,
    };

    let outcome = Outcome {
        view: step.view,
        redirect: ws.session.take_redirect(),
        toasts: ws.session.notifier().drain(),
        events: step.events,
    };

    if let Some(to) = &outcome.redirect {
        tracing::debug!(action = name, redirect = %to, "dispatch finished with redirect");
    }
    outcome
}

fn grid(ws: &Workspace) -> View {
    View::AlertsGrid(AlertsGridView::new(ws.alerts.alerts()))
}

/// Loads the list when `id` is not known yet, e.g. on a fresh workspace.
async fn ensure_alert(ws: &mut Workspace, id: i64) -> bool {
    if ws.alerts.find(id).is_none() {
        let _ = ws.alerts.list(&mut ws.session).await;
    }
    ws.alerts.find(id).is_some()
}

async fn alerts(ws: &mut Workspace, action: Action) -> Step {
    match action {
        Action::LoadAlerts => match ws.alerts.list(&mut ws.session).await {
            Ok(()) => Step::show(grid(ws)),
            Err(_) => Step::none(),
        },

        Action::NewAlert => Step::show(View::AlertForm(AlertFormView::new(
            None,
            AlertForm::blank(),
            Default::default(),
        ))),

        Action::EditAlert(id) => {
            if !ensure_alert(ws, id).await {
                if ws.session.is_authenticated() {
                    ws.session.notifier().error("Alert not found.");
                }
                return Step::none();
            }
            match ws.alerts.find(id) {
                Some(a) => Step::show(View::AlertForm(AlertFormView::new(
                    Some(id),
                    AlertForm::from_alert(a),
                    Default::default(),
                ))),
                None => Step::none(),
            }
        }

        Action::SubmitAlert { id, form } => {
            match ws.alerts.save(&mut ws.session, id, &form).await {
                Ok(()) => Step::show(grid(ws)).with_event(ALERTS_CHANGED),
                Err(SaveError::Invalid(errors)) => {
                    Step::show(View::AlertForm(AlertFormView::new(id, form, errors)))
                }
                Err(SaveError::Api(ApiError::Unauthorized)) => Step::none(),
                Err(SaveError::Api(_)) => {
                    Step::show(View::AlertForm(AlertFormView::new(id, form, Default::default())))
                }
            }
        }

        Action::DeleteAlert { id, confirmed: false } => {
            if !ensure_alert(ws, id).await {
                return Step::none();
            }
            Step::show(View::Confirm(ConfirmPrompt {
                message: "Are you sure you want to delete this alert?".to_string(),
                confirm_url: format!("/alerts/{id}/delete?confirmed=true"),
            }))
        }

        Action::DeleteAlert { id, confirmed: true } => {
            if !ensure_alert(ws, id).await {
                return Step::show(grid(ws));
            }
            match ws.alerts.delete(&mut ws.session, id).await {
                Ok(true) => Step::show(grid(ws)).with_event(ALERTS_CHANGED),
                Ok(false) => Step::show(grid(ws)),
                Err(_) => Step::none(),
            }
        }

        Action::ToggleAlert(id) => match ws.alerts.toggle_active(&mut ws.session, id).await {
            Ok(()) => Step::show(grid(ws)).with_event(ALERTS_CHANGED),
            Err(_) => Step::none(),
        },

        Action::OpenBulk => Step::show(View::BulkTable(BulkTableView::new(&[BulkRow::empty()], &[]))),

        Action::AddBulkRow(mut rows) => {
            rows.push(BulkRow::empty());
            Step::show(View::BulkTable(BulkTableView::new(&rows, &[])))
        }

        Action::SampleBulkRows => Step::show(View::BulkTable(BulkTableView::new(&BulkRow::samples(), &[]))),

        Action::BulkCreate(rows) => {
            let rows: Vec<BulkRow> = rows.into_iter().filter(|r| !r.is_blank()).collect();
            let report = ws.alerts.bulk_create(&mut ws.session, &rows).await;

            if report.created > 0 {
                Step::show(grid(ws)).with_event(ALERTS_CHANGED)
            } else if rows.is_empty() {
                Step::show(View::BulkTable(BulkTableView::new(&[BulkRow::empty()], &[])))
            } else {
                Step::show(View::BulkTable(BulkTableView::new(&rows, &report.rejected)))
            }
        }

        _ => Step::none(),
    }
}

fn dashboard_view(snapshot: &DashboardSnapshot, today: NaiveDate) -> Step {
    Step::show(View::Dashboard(DashboardView::new(
        snapshot,
        DateRange::last_days(today, DEFAULT_FILTER_DAYS),
    )))
}

async fn dashboard(ws: &mut Workspace, action: Action) -> Step {
    match action {
        Action::LoadDashboard { today } => match ws.dashboard.load(&mut ws.session).await {
            Ok(()) => dashboard_view(&ws.dashboard.snapshot(), today),
            Err(_) => Step::none(),
        },

        Action::ApplyDateFilter { start, end, today } => {
            if !ws.dashboard.is_loaded() && ws.dashboard.load(&mut ws.session).await.is_err() {
                return Step::none();
            }
            match ws.dashboard.apply_filter(&start, &end) {
                Ok(snapshot) => dashboard_view(&snapshot, today),
                Err(msg) => {
                    ws.session.notifier().error(msg);
                    Step::none()
                }
            }
        }

        Action::ResetDateFilter { today } => {
            if !ws.dashboard.is_loaded() && ws.dashboard.load(&mut ws.session).await.is_err() {
                return Step::none();
            }
            let snapshot = ws.dashboard.reset_filter();
            ws.session.notifier().info("Showing all data");
            dashboard_view(&snapshot, today)
        }

        _ => Step::none(),
    }
}

async fn trades(ws: &mut Workspace, action: Action) -> Step {
    match action {
        Action::LoadTrades { date } => match ws.list.load_trades(&mut ws.session, date.as_deref()).await {
            Ok(listing) => Step::show(View::TradeList(TradeListView::from(&listing))),
            Err(ApiError::Unauthorized) => Step::none(),
            Err(e) => {
                ws.session
                    .notifier()
                    .error(format!("Error: {}", e.user_message("could not load trades")));
                Step::none()
            }
        },

        Action::ShowPnlSummary => match ws.list.pnl_summary(&mut ws.session).await {
            Ok(summary) => Step::show(View::PnlSummary(PnlSummaryView::new(&summary))),
            Err(ApiError::Unauthorized) => Step::none(),
            Err(e) => Step::show(View::PnlSummary(PnlSummaryView::failed(format!(
                "Error loading P&L data: {e}"
            )))),
        },

        Action::NewTrade => Step::show(View::TradeForm(TradeFormView::new(TradeForm::default(), Default::default()))),

        Action::SubmitTrade(form) => match ws.list.trades.create(&mut ws.session, &form).await {
            Ok(()) => Step::show(View::TradeForm(TradeFormView::new(TradeForm::default(), Default::default())))
                .with_event(TRADES_CHANGED),
            Err(SaveError::Invalid(errors)) => Step::show(View::TradeForm(TradeFormView::new(form, errors))),
            Err(SaveError::Api(ApiError::Unauthorized)) => Step::none(),
            Err(SaveError::Api(_)) => Step::show(View::TradeForm(TradeFormView::new(form, Default::default()))),
        },

        _ => Step::none(),
    }
}

async fn auth(ws: &mut Workspace, action: Action) -> Step {
    let session = &mut ws.session;

    match action {
        Action::VerifyToken => {
            if auth_service::verify_token(session).await {
                session.navigate(HOME_PATH);
                Step::none()
            } else {
                Step::show(View::Login(LoginView::default()))
            }
        }

        Action::Login { username, password } => {
            match auth_service::login(session, &username, &password).await {
                Ok(()) => Step::none(),
                Err(errors) => Step::show(View::Login(LoginView {
                    username: username.trim().to_string(),
                    errors,
                })),
            }
        }

        Action::ShowRegister => Step::show(View::Register(RegisterView::default())),

        Action::Register(form) => {
            let checks = PasswordChecks::of(&form.password);
            match auth_service::register(session, &form).await {
                Ok(msg) => Step::show(View::Register(RegisterView {
                    checks,
                    success: Some(msg),
                    ..RegisterView::default()
                })),
                Err(errors) => Step::show(View::Register(RegisterView {
                    username: form.username.trim().to_string(),
                    email: form.email.trim().to_string(),
                    checks,
                    errors,
                    success: None,
                })),
            }
        }

        Action::Logout => {
            auth_service::logout(session).await;
            Step::none()
        }

        Action::ShowForgotPassword => Step::show(View::ForgotPassword(ForgotPasswordView::default())),

        Action::ForgotPassword { email } => {
            let email = email.trim().to_string();
            match auth_service::forgot_password(session, &email).await {
                Ok(msg) => Step::show(View::ForgotPassword(ForgotPasswordView {
                    success: Some(msg),
                    ..ForgotPasswordView::default()
                })),
                Err(errors) => Step::show(View::ForgotPassword(ForgotPasswordView {
                    email,
                    errors,
                    success: None,
                })),
            }
        }

        Action::ShowResetPassword { token } => Step::show(View::ResetPassword(ResetPasswordView {
            token,
            ..ResetPasswordView::default()
        })),

        Action::ResetPassword { token, password, confirm } => {
            match auth_service::reset_password(session, &token, &password, &confirm).await {
                Ok(msg) => Step::show(View::ResetPassword(ResetPasswordView {
                    token: String::new(),
                    errors: Default::default(),
                    success: Some(msg),
                })),
                Err(errors) => Step::show(View::ResetPassword(ResetPasswordView {
                    token,
                    errors,
                    success: None,
                })),
            }
        }

        _ => Step::none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::api_client::ApiClient;

    fn workspace() -> Workspace {
        Workspace::new(ApiClient::new("http://127.0.0.1:9", None), None)
    }

    #[test]
    fn register_actions_compare_by_form() {
        let form = RegisterForm {
            username: "newbie".into(),
            email: "newbie@example.com".into(),
            password: "Secret123".into(),
            confirm_password: "Secret123".into(),
        };
        let other = RegisterForm { username: "other".into(), ..form.clone() };

        assert_eq!(Action::Register(form.clone()), Action::Register(form.clone()));
        assert_ne!(Action::Register(form), Action::Register(other));
    }

    #[tokio::test]
    async fn new_alert_opens_blank_option_form() {
        let mut ws = workspace();
        let out = dispatch(&mut ws, Action::NewAlert).await;

        let Some(View::AlertForm(v)) = out.view else {
            panic!("expected alert form, got {:?}", out.view);
        };
        assert!(v.is_option);
        assert_eq!(v.title, "Add New Alert");
        assert!(out.redirect.is_none());
    }

    #[tokio::test]
    async fn invalid_alert_never_leaves_the_form() {
        let mut ws = workspace();
        let form = AlertForm { instrument_type: "STOCK".into(), ..AlertForm::default() };
        let out = dispatch(&mut ws, Action::SubmitAlert { id: None, form }).await;

        let Some(View::AlertForm(v)) = out.view else {
            panic!("expected alert form");
        };
        assert!(v.errors.contains_key("symbol"));
        assert!(out.toasts.is_empty());
    }

    #[tokio::test]
    async fn sample_rows_fill_the_bulk_table() {
        let mut ws = workspace();
        let out = dispatch(&mut ws, Action::SampleBulkRows).await;

        let Some(View::BulkTable(t)) = out.view else {
            panic!("expected bulk table");
        };
        assert_eq!(t.rows.len(), 3);
        assert_eq!(t.rows[0].row.underlying, "RELIANCE");
    }

    #[tokio::test]
    async fn all_blank_bulk_rows_ask_for_input() {
        let mut ws = workspace();
        let out = dispatch(&mut ws, Action::BulkCreate(vec![BulkRow::empty(), BulkRow::empty()])).await;

        assert!(matches!(out.view, Some(View::BulkTable(_))));
        assert_eq!(out.toasts.len(), 1);
        assert_eq!(out.toasts[0].message, "Please add at least one alert row.");
    }

    #[tokio::test]
    async fn login_validation_stays_local() {
        let mut ws = workspace();
        let out = dispatch(
            &mut ws,
            Action::Login { username: "  ".into(), password: "x".into() },
        )
        .await;

        let Some(View::Login(v)) = out.view else {
            panic!("expected login form");
        };
        assert_eq!(
            v.errors.get("_form").map(String::as_str),
            Some("Please enter both username and password.")
        );
        assert!(!ws.session.is_authenticated());
    }

    #[tokio::test]
    async fn logout_without_token_goes_to_login() {
        let mut ws = workspace();
        let out = dispatch(&mut ws, Action::Logout).await;
        assert_eq!(out.redirect.as_deref(), Some("/login"));
    }
}
