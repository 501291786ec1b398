use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Response,
    Extension,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::{
    auth::AuthToken,
    commands::Action,
    controllers::{fragment_response, page_response, run, Screen},
    AppState,
};

const LIST: Screen = Screen {
    page: "pages/list",
    title: "Trade List",
    nav: "list",
};

#[derive(Deserialize)]
pub struct DateQuery {
    #[serde(default)]
    pub date: Option<String>,
}

pub async fn get_list_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    token: Option<Extension<AuthToken>>,
    Query(q): Query<DateQuery>,
) -> Response {
    let handled = run(&state, token, Action::LoadTrades { date: q.date }).await;
    page_response(&state, &headers, jar, handled, LIST)
}

// GET /list/trades?date=YYYY-MM-DD
pub async fn get_list_trades(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    token: Option<Extension<AuthToken>>,
    Query(q): Query<DateQuery>,
) -> Response {
    let handled = run(&state, token, Action::LoadTrades { date: q.date }).await;
    fragment_response(&state, &headers, jar, handled, LIST)
}

// GET /list/pnl
pub async fn get_list_pnl(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    token: Option<Extension<AuthToken>>,
) -> Response {
    let handled = run(&state, token, Action::ShowPnlSummary).await;
    fragment_response(&state, &headers, jar, handled, LIST)
}
