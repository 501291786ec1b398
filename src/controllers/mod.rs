//! HTTP handlers. Each one turns the request into an [`Action`], runs it in the
//! caller's workspace and renders the [`Outcome`] either as a full page or as
//! an htmx fragment.

pub mod alerts_controller;
pub mod auth_controller;
pub mod dashboard_controller;
pub mod home_controller;
pub mod list_controller;

use axum::{
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Extension,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    auth::{is_htmx, AuthToken},
    commands::{self, Action, Outcome},
    render::{self, Chrome},
    services::auth_service,
    AppState,
};

const CLEAR_MODAL: &str = r#"<div id="modal" hx-swap-oob="innerHTML"></div>"#;

/// Page a handler belongs to; used for full-page responses.
#[derive(Debug, Clone, Copy)]
pub struct Screen {
    pub page: &'static str,
    pub title: &'static str,
    pub nav: &'static str,
}

pub struct Handled {
    pub outcome: Outcome,
    before: Option<String>,
    after: Option<String>,
}

pub(crate) fn htmx_redirect(path: &str) -> Response {
    let mut headers = HeaderMap::new();
    if let Ok(v) = HeaderValue::from_str(path) {
        headers.insert("HX-Redirect", v);
    }
    (StatusCode::OK, headers, Html(String::new())).into_response()
}

fn hx_trigger_value(events: &[&str]) -> HeaderValue {
    if events.len() == 1 {
        return HeaderValue::from_str(events[0]).unwrap_or_else(|_| HeaderValue::from_static(""));
    }

    let mut map = serde_json::Map::new();
    for &e in events {
        map.insert(e.to_string(), serde_json::Value::Bool(true));
    }

    let json = serde_json::Value::Object(map).to_string();
    HeaderValue::from_str(&json).unwrap_or_else(|_| HeaderValue::from_static(""))
}

fn server_error(e: String) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Html(format!("template error: {e}"))).into_response()
}

pub fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

/// Runs `action` in the workspace of the presented token.
pub async fn run(state: &AppState, token: Option<Extension<AuthToken>>, action: Action) -> Handled {
    let before = token.map(|Extension(AuthToken(t))| t);

    let shared = state.workspaces.checkout(&state.api, before.as_deref());
    let mut ws = shared.lock().await;
    let outcome = commands::dispatch(&mut ws, action).await;
    let after = ws.session.token().map(str::to_string);
    let confirmed = ws.session.token_confirmed();
    drop(ws);

    // Only tokens the backend accepted get a stored workspace.
    if let (Some(t), true) = (after.as_deref(), confirmed) {
        state.workspaces.adopt(t, &shared);
    }

    Handled { outcome, before, after }
}

/// Mirrors a token change made by the action into the cookie. A dropped or
/// replaced token also drops its workspace.
fn sync_cookie(state: &AppState, jar: CookieJar, before: Option<&str>, after: Option<&str>) -> CookieJar {
    if before == after {
        return jar;
    }

    if let Some(old) = before {
        state.workspaces.evict(old);
    }

    match after {
        Some(t) => jar.add(auth_service::auth_cookie(&state.settings, t.to_string())),
        None => jar.add(auth_service::clear_auth_cookie(&state.settings)),
    }
}

fn redirect(headers: &HeaderMap, to: &str) -> Response {
    if is_htmx(headers) {
        htmx_redirect(to)
    } else {
        Redirect::to(to).into_response()
    }
}

/// Full page with the outcome's view in its slot. htmx requests get the page
/// body without the layout.
pub fn page_response(
    state: &AppState,
    headers: &HeaderMap,
    jar: CookieJar,
    handled: Handled,
    screen: Screen,
) -> Response {
    let Handled { outcome, before, after } = handled;
    let jar = sync_cookie(state, jar, before.as_deref(), after.as_deref());

    if let Some(to) = &outcome.redirect {
        return (jar, redirect(headers, to)).into_response();
    }

    let body = match render::render_page(state, screen.page, outcome.view.as_ref()) {
        Ok(b) => b,
        Err(e) => return server_error(e),
    };

    if is_htmx(headers) {
        let toasts = render::render_toasts_oob(state, &outcome.toasts).unwrap_or_default();
        return (StatusCode::OK, jar, Html(body + &toasts)).into_response();
    }

    let chrome = Chrome {
        title: screen.title,
        nav: screen.nav,
        signed_in: after.is_some(),
    };
    match render::render_full(state, chrome, body, &outcome.toasts) {
        Ok(page) => (StatusCode::OK, jar, Html(page)).into_response(),
        Err(e) => server_error(e),
    }
}

/// htmx fragment: the view retargeted to its container, toasts out of band.
/// Plain form posts fall back to the full page.
pub fn fragment_response(
    state: &AppState,
    headers: &HeaderMap,
    jar: CookieJar,
    handled: Handled,
    screen: Screen,
) -> Response {
    if !is_htmx(headers) {
        return page_response(state, headers, jar, handled, screen);
    }

    let Handled { outcome, before, after } = handled;
    let jar = sync_cookie(state, jar, before.as_deref(), after.as_deref());

    if let Some(to) = &outcome.redirect {
        return (jar, htmx_redirect(to)).into_response();
    }

    let mut out = HeaderMap::new();
    let mut html = String::new();

    match &outcome.view {
        Some(view) => {
            match render::render_view(state, view) {
                Ok(h) => html.push_str(&h),
                Err(e) => return server_error(e),
            }
            out.insert("HX-Retarget", HeaderValue::from_static(view.target()));
            out.insert("HX-Reswap", HeaderValue::from_static("innerHTML"));
            if view.closes_modal() {
                html.push_str(CLEAR_MODAL);
            }
        }
        None => {
            out.insert("HX-Reswap", HeaderValue::from_static("none"));
        }
    }

    match render::render_toasts_oob(state, &outcome.toasts) {
        Ok(t) => html.push_str(&t),
        Err(e) => return server_error(e),
    }

    if !outcome.events.is_empty() {
        out.insert("HX-Trigger", hx_trigger_value(&outcome.events));
    }

    (StatusCode::OK, jar, out, Html(html)).into_response()
}
