use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::{services::session::LOGIN_PATH, AppState};

/// Bearer token the browser presented in its cookie. Presence says nothing
/// about validity; the backend decides that on the first call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken(pub String);

fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;

    for part in raw.split(';') {
        let mut it = part.trim().splitn(2, '=');
        let (Some(k), Some(v)) = (it.next(), it.next()) else {
            continue;
        };
        if k.trim() == name {
            return Some(v.trim().to_string());
        }
    }
    None
}

pub async fn inject_token(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let token = get_cookie(req.headers(), &state.settings.token_cookie_name).filter(|t| !t.is_empty());

    if let Some(token) = token {
        req.extensions_mut().insert(AuthToken(token));
    }

    next.run(req).await
}

pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("HX-Request")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn is_public_path(path: &str) -> bool {
    matches!(
        path,
        "/login" | "/register" | "/logout" | "/forgot-password" | "/reset-password" | "/health" | "/favicon.ico"
    ) || path.starts_with("/static/")
}

pub async fn require_auth(
    State(_state): State<AppState>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let path = req.uri().path();

    if is_public_path(path) || req.extensions().get::<AuthToken>().is_some() {
        return next.run(req).await;
    }

    tracing::debug!(path, "no token; sending to login");

    if is_htmx(req.headers()) {
        let mut headers = HeaderMap::new();
        headers.insert("HX-Redirect", HeaderValue::from_static(LOGIN_PATH));
        return (StatusCode::OK, headers, Html(String::new())).into_response();
    }

    Redirect::to(LOGIN_PATH).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_lookup_skips_malformed_pairs() {
        let mut h = HeaderMap::new();
        h.insert(header::COOKIE, HeaderValue::from_static("junk; theme=dark; authToken=abc.def"));
        assert_eq!(get_cookie(&h, "authToken").as_deref(), Some("abc.def"));
        assert_eq!(get_cookie(&h, "missing"), None);
    }

    #[test]
    fn auth_pages_are_public() {
        assert!(is_public_path("/login"));
        assert!(is_public_path("/static/app.css"));
        assert!(!is_public_path("/"));
        assert!(!is_public_path("/alerts"));
    }
}
