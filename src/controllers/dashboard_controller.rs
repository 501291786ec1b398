use axum::{
    extract::State,
    http::HeaderMap,
    response::Response,
    Extension, Form,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::{
    auth::AuthToken,
    commands::Action,
    controllers::{fragment_response, page_response, run, today, Screen},
    AppState,
};

const DASHBOARD: Screen = Screen {
    page: "pages/dashboard",
    title: "Dashboard",
    nav: "dashboard",
};

pub async fn get_dashboard_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    token: Option<Extension<AuthToken>>,
) -> Response {
    let handled = run(&state, token, Action::LoadDashboard { today: today() }).await;
    page_response(&state, &headers, jar, handled, DASHBOARD)
}

// GET /dashboard/data: refetch everything and drop the filter
pub async fn get_dashboard_data(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    token: Option<Extension<AuthToken>>,
) -> Response {
    let handled = run(&state, token, Action::LoadDashboard { today: today() }).await;
    fragment_response(&state, &headers, jar, handled, DASHBOARD)
}

#[derive(Deserialize)]
pub struct FilterForm {
    #[serde(default, rename = "startDate")]
    pub start_date: String,
    #[serde(default, rename = "endDate")]
    pub end_date: String,
}

pub async fn post_dashboard_filter(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    token: Option<Extension<AuthToken>>,
    Form(form): Form<FilterForm>,
) -> Response {
    let action = Action::ApplyDateFilter {
        start: form.start_date,
        end: form.end_date,
        today: today(),
    };
    let handled = run(&state, token, action).await;
    fragment_response(&state, &headers, jar, handled, DASHBOARD)
}

pub async fn post_dashboard_reset(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    token: Option<Extension<AuthToken>>,
) -> Response {
    let handled = run(&state, token, Action::ResetDateFilter { today: today() }).await;
    fragment_response(&state, &headers, jar, handled, DASHBOARD)
}
