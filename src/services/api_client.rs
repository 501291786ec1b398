use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;

use crate::error::ApiError;

/// Thin wrapper over the stock-panel backend's REST API.
///
/// Knows the base URL and how to attach a bearer token; the 401 policy lives
/// in [`crate::services::session::Session`].
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Self {
        let mut builder = Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }

        let http = builder.build().unwrap_or_else(|e| {
            tracing::warn!("falling back to default http client: {e}");
            Client::new()
        });

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let rb = self.http.request(method, self.url(path));
        match token.filter(|t| !t.is_empty()) {
            Some(t) => rb.bearer_auth(t),
            None => rb,
        }
    }

    /// Sends the request; any non-2xx status becomes [`ApiError::Status`]
    /// carrying the backend's `message` when it sent one.
    pub async fn execute(&self, rb: RequestBuilder) -> Result<Response, ApiError> {
        let res = rb
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }

        let body = res.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }
}

fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<ErrorBody>(trimmed) {
        Ok(b) => b.message.filter(|m| !m.trim().is_empty()),
        // plain-text error pages from the router
        Err(_) if !trimmed.starts_with('{') && trimmed.len() <= 200 => Some(trimmed.to_string()),
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slash() {
        let api = ApiClient::new("http://localhost:8080/", None);
        assert_eq!(api.url("/alerts"), "http://localhost:8080/alerts");
        assert_eq!(api.url("pnl"), "http://localhost:8080/pnl");
    }

    #[test]
    fn error_message_prefers_json_message() {
        assert_eq!(error_message(r#"{"success":false,"message":"Alert not found"}"#).as_deref(), Some("Alert not found"));
        assert_eq!(error_message(r#"{"success":false}"#), None);
        assert_eq!(error_message("404 page not found\n").as_deref(), Some("404 page not found"));
        assert_eq!(error_message(""), None);
    }
}
