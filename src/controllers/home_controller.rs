use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Extension, Form,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;

use crate::{
    auth::{is_htmx, AuthToken},
    commands::Action,
    controllers::{fragment_response, page_response, run, Screen},
    render::{self, Chrome},
    services::trades_service::TradeForm,
    AppState,
};

const HOME: Screen = Screen {
    page: "pages/home",
    title: "Trade Entry",
    nav: "home",
};

// GET /
pub async fn get_home(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    token: Option<Extension<AuthToken>>,
) -> Response {
    let handled = run(&state, token, Action::NewTrade).await;
    page_response(&state, &headers, jar, handled, HOME)
}

// POST /trades
pub async fn post_trade(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    token: Option<Extension<AuthToken>>,
    Form(form): Form<TradeForm>,
) -> Response {
    let handled = run(&state, token, Action::SubmitTrade(form)).await;
    fragment_response(&state, &headers, jar, handled, HOME)
}

pub async fn not_found(
    State(state): State<AppState>,
    headers: HeaderMap,
    token: Option<Extension<AuthToken>>,
) -> Response {
    let body = match state.hbs.render("pages/not_found", &json!({})) {
        Ok(b) => b,
        Err(e) => return (StatusCode::INTERNAL_SERVER_ERROR, Html(e.to_string())).into_response(),
    };

    if is_htmx(&headers) {
        return (StatusCode::NOT_FOUND, Html(body)).into_response();
    }

    let chrome = Chrome {
        title: "Not Found",
        nav: "",
        signed_in: token.is_some(),
    };
    match render::render_full(&state, chrome, body, &[]) {
        Ok(page) => (StatusCode::NOT_FOUND, Html(page)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Html(e)).into_response(),
    }
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Html("ok".to_string()))
}
