use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Response,
    Extension,
};
use axum_extra::extract::{cookie::CookieJar, Form as MultiForm};
use serde::Deserialize;

use crate::{
    auth::AuthToken,
    commands::Action,
    controllers::{fragment_response, page_response, run, Screen},
    services::alerts_service::{AlertForm, BulkRow},
    AppState,
};

const ALERTS: Screen = Screen {
    page: "pages/alerts",
    title: "Alerts",
    nav: "alerts",
};

type Token = Option<Extension<AuthToken>>;

// ---------------- Pages ----------------

pub async fn get_alerts_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    token: Token,
) -> Response {
    let handled = run(&state, token, Action::LoadAlerts).await;
    page_response(&state, &headers, jar, handled, ALERTS)
}

// ---------------- Partials ----------------

async fn fragment(state: AppState, headers: HeaderMap, jar: CookieJar, token: Token, action: Action) -> Response {
    let handled = run(&state, token, action).await;
    fragment_response(&state, &headers, jar, handled, ALERTS)
}

// GET /alerts/list
pub async fn get_alerts_list(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    token: Token,
) -> Response {
    fragment(state, headers, jar, token, Action::LoadAlerts).await
}

// GET /alerts/new
pub async fn get_new_alert(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    token: Token,
) -> Response {
    fragment(state, headers, jar, token, Action::NewAlert).await
}

// GET /alerts/:id/edit
pub async fn get_edit_alert(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    token: Token,
    Path(id): Path<i64>,
) -> Response {
    fragment(state, headers, jar, token, Action::EditAlert(id)).await
}

// POST /alerts
pub async fn post_create_alert(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    token: Token,
    axum::Form(form): axum::Form<AlertForm>,
) -> Response {
    fragment(state, headers, jar, token, Action::SubmitAlert { id: None, form }).await
}

// POST /alerts/:id
pub async fn post_update_alert(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    token: Token,
    Path(id): Path<i64>,
    axum::Form(form): axum::Form<AlertForm>,
) -> Response {
    fragment(state, headers, jar, token, Action::SubmitAlert { id: Some(id), form }).await
}

#[derive(Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub confirmed: bool,
}

// POST /alerts/:id/delete[?confirmed=true]
pub async fn post_delete_alert(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    token: Token,
    Path(id): Path<i64>,
    Query(q): Query<DeleteQuery>,
) -> Response {
    let action = Action::DeleteAlert {
        id,
        confirmed: q.confirmed,
    };
    fragment(state, headers, jar, token, action).await
}

// POST /alerts/:id/toggle
pub async fn post_toggle_alert(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    token: Token,
    Path(id): Path<i64>,
) -> Response {
    fragment(state, headers, jar, token, Action::ToggleAlert(id)).await
}

// ---------------- Bulk ----------------

/// The bulk table posts one value per row for every column.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BulkForm {
    pub symbol: Vec<String>,
    pub underlying: Vec<String>,
    #[serde(rename = "optionType")]
    pub option_type: Vec<String>,
    pub strike: Vec<String>,
    pub expiry: Vec<String>,
    #[serde(rename = "alertType")]
    pub alert_type: Vec<String>,
    pub target: Vec<String>,
    pub condition: Vec<String>,
    pub message: Vec<String>,
}

impl BulkForm {
    pub fn into_rows(self) -> Vec<BulkRow> {
        let columns = [
            &self.symbol,
            &self.underlying,
            &self.option_type,
            &self.strike,
            &self.expiry,
            &self.alert_type,
            &self.target,
            &self.condition,
            &self.message,
        ];
        let n = columns.iter().map(|c| c.len()).max().unwrap_or(0);
        let cell = |col: &Vec<String>, i: usize| col.get(i).cloned().unwrap_or_default();

        (0..n)
            .map(|i| BulkRow {
                symbol: cell(&self.symbol, i),
                underlying: cell(&self.underlying, i),
                option_type: cell(&self.option_type, i),
                strike: cell(&self.strike, i),
                expiry: cell(&self.expiry, i),
                alert_type: cell(&self.alert_type, i),
                target: cell(&self.target, i),
                condition: cell(&self.condition, i),
                message: cell(&self.message, i),
            })
            .collect()
    }
}

// GET /alerts/bulk
pub async fn get_bulk(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    token: Token,
) -> Response {
    fragment(state, headers, jar, token, Action::OpenBulk).await
}

// POST /alerts/bulk/row
pub async fn post_bulk_row(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    token: Token,
    MultiForm(form): MultiForm<BulkForm>,
) -> Response {
    fragment(state, headers, jar, token, Action::AddBulkRow(form.into_rows())).await
}

// POST /alerts/bulk/sample
pub async fn post_bulk_sample(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    token: Token,
) -> Response {
    fragment(state, headers, jar, token, Action::SampleBulkRows).await
}

// POST /alerts/bulk
pub async fn post_bulk_create(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    token: Token,
    MultiForm(form): MultiForm<BulkForm>,
) -> Response {
    fragment(state, headers, jar, token, Action::BulkCreate(form.into_rows())).await
}
