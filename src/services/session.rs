use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    error::ApiError,
    services::{api_client::ApiClient, notifications::Notifier},
};

pub const LOGIN_PATH: &str = "/login";

/// Per-browser application context handed to every resource manager.
///
/// Holds the bearer token, the toast queue and the pending navigation. A 401
/// from an authenticated endpoint discards the token and schedules exactly one
/// redirect to the login view until a new token is set.
pub struct Session {
    api: ApiClient,
    token: Option<String>,
    notifier: Notifier,
    redirect: Option<String>,
    sent_to_login: bool,
    login_redirects: u32,
    confirmed: bool,
}

impl Session {
    pub fn new(api: ApiClient, token: Option<String>) -> Self {
        Self {
            api,
            token: token.filter(|t| !t.is_empty()),
            notifier: Notifier::default(),
            redirect: None,
            sent_to_login: false,
            login_redirects: 0,
            confirmed: false,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Stores a token the backend just issued.
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token).filter(|t| !t.is_empty());
        self.confirmed = self.token.is_some();
        self.sent_to_login = false;
    }

    pub fn clear_token(&mut self) {
        self.token = None;
        self.confirmed = false;
    }

    /// True once the backend has accepted the current token at least once.
    pub fn token_confirmed(&self) -> bool {
        self.confirmed && self.token.is_some()
    }

    pub(crate) fn confirm_token(&mut self) {
        self.confirmed = self.token.is_some();
    }

    pub fn notifier(&mut self) -> &mut Notifier {
        &mut self.notifier
    }

    pub fn navigate(&mut self, path: impl Into<String>) {
        self.redirect = Some(path.into());
    }

    pub fn take_redirect(&mut self) -> Option<String> {
        self.redirect.take()
    }

    /// How many times this session was sent to the login view.
    pub fn login_redirects(&self) -> u32 {
        self.login_redirects
    }

    fn force_login(&mut self) {
        self.clear_token();
        if self.sent_to_login {
            return;
        }
        self.sent_to_login = true;
        self.login_redirects += 1;
        tracing::info!("backend rejected token; redirecting to login");
        self.navigate(LOGIN_PATH);
    }

    /// Authenticated call: bearer token attached when present, 401 handled.
    pub async fn call(
        &mut self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<Response, ApiError> {
        let res = self.send(method, path, query, body).await;
        match res {
            Err(ApiError::Status { status: 401, .. }) => {
                self.force_login();
                Err(ApiError::Unauthorized)
            }
            Ok(r) => {
                self.confirm_token();
                Ok(r)
            }
            other => other,
        }
    }

    pub async fn call_json<T: DeserializeOwned>(
        &mut self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let res = self.call(method, path, query, body).await?;
        Ok(res.json::<T>().await?)
    }

    /// Call for the public auth endpoints: a 401 there is an ordinary error
    /// (wrong password, stale token) and must not trigger the login redirect.
    pub async fn call_public_json<T: DeserializeOwned>(
        &mut self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let res = self.send(method, path, &[], body).await?;
        Ok(res.json::<T>().await?)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<Response, ApiError> {
        tracing::debug!(%method, path, "backend request");

        let mut rb = self.api.request(method, path, self.token());
        if !query.is_empty() {
            rb = rb.query(query);
        }
        if let Some(b) = body {
            rb = rb.json(&b);
        }

        self.api.execute(rb).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(token: Option<&str>) -> Session {
        Session::new(ApiClient::new("http://127.0.0.1:9", None), token.map(str::to_string))
    }

    #[test]
    fn empty_token_counts_as_absent() {
        assert!(!session(Some("")).is_authenticated());
        assert!(session(Some("abc")).is_authenticated());
    }

    #[test]
    fn force_login_redirects_once_until_new_token() {
        let mut s = session(Some("abc"));

        s.force_login();
        s.force_login();
        assert_eq!(s.login_redirects(), 1);
        assert_eq!(s.take_redirect().as_deref(), Some(LOGIN_PATH));
        assert!(s.take_redirect().is_none());
        assert!(s.token().is_none());

        s.set_token("fresh".into());
        s.force_login();
        assert_eq!(s.login_redirects(), 2);
    }

    #[test]
    fn cookie_token_is_unconfirmed_until_accepted() {
        let mut s = session(Some("abc"));
        assert!(!s.token_confirmed());

        s.confirm_token();
        assert!(s.token_confirmed());

        s.force_login();
        assert!(!s.token_confirmed());

        s.set_token("issued".into());
        assert!(s.token_confirmed());
    }
}
