use std::sync::LazyLock;

use axum_extra::extract::cookie::{Cookie, SameSite};
use regex::Regex;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::{
    config::Settings,
    error::{ApiError, FieldErrors},
    models::auth::{
        ForgotPasswordRequest, LoginRequest, LoginResponse, MessageResponse, RegisterRequest,
        ResetPasswordRequest,
    },
    services::session::{Session, LOGIN_PATH},
};

pub const HOME_PATH: &str = "/dashboard";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn auth_cookie(settings: &Settings, token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(settings.token_cookie_name.clone(), token);
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    if settings.cookie_secure {
        cookie.set_secure(true);
    }
    cookie
}

pub fn clear_auth_cookie(settings: &Settings) -> Cookie<'static> {
    let mut cookie = Cookie::new(settings.token_cookie_name.clone(), "");
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.make_removal();
    cookie
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PasswordChecks {
    pub length: bool,
    pub uppercase: bool,
    pub lowercase: bool,
    pub number: bool,
}

impl PasswordChecks {
    pub fn of(password: &str) -> Self {
        Self {
            length: password.chars().count() >= 8,
            uppercase: password.chars().any(|c| c.is_ascii_uppercase()),
            lowercase: password.chars().any(|c| c.is_ascii_lowercase()),
            number: password.chars().any(|c| c.is_ascii_digit()),
        }
    }

    pub fn all_met(&self) -> bool {
        self.length && self.uppercase && self.lowercase && self.number
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "confirmPassword")]
    pub confirm_password: String,
}

pub fn validate_registration(form: &RegisterForm) -> FieldErrors {
    let mut errs = FieldErrors::new();

    let username = form.username.trim();
    let email = form.email.trim();

    if username.is_empty() || email.is_empty() || form.password.is_empty() || form.confirm_password.is_empty() {
        errs.insert("_form".into(), "Please fill in all fields.".into());
        return errs;
    }

    if !is_valid_email(email) {
        errs.insert("email".into(), "Please enter a valid email address.".into());
    }

    if !PasswordChecks::of(&form.password).all_met() {
        errs.insert("password".into(), "Please ensure your password meets all requirements.".into());
    }

    if form.password != form.confirm_password {
        errs.insert("confirmPassword".into(), "Passwords do not match.".into());
    }

    errs
}

fn form_error(msg: impl Into<String>) -> FieldErrors {
    let mut errs = FieldErrors::new();
    errs.insert("_form".into(), msg.into());
    errs
}

fn server_or(e: &ApiError, fallback: &str) -> FieldErrors {
    match e {
        ApiError::Network(_) => form_error("Network error. Please try again."),
        _ => form_error(e.user_message(fallback)),
    }
}

fn to_body<T: Serialize>(v: &T) -> Result<serde_json::Value, FieldErrors> {
    serde_json::to_value(v).map_err(|e| form_error(format!("Could not encode request: {e}")))
}

/// Exchanges credentials for a bearer token and stores it in the session.
pub async fn login(session: &mut Session, username: &str, password: &str) -> Result<(), FieldErrors> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(form_error("Please enter both username and password."));
    }

    let body = to_body(&LoginRequest {
        username: username.to_string(),
        password: password.to_string(),
    })?;

    let res = session
        .call_public_json::<LoginResponse>(Method::POST, "/auth/login", Some(body))
        .await;

    match res {
        Ok(r) if !r.token.is_empty() => {
            tracing::info!(username, "login succeeded");
            session.set_token(r.token);
            session.notifier().success("Login successful! Redirecting...");
            session.navigate(HOME_PATH);
            Ok(())
        }
        Ok(_) => Err(form_error("Login failed. Please check your credentials.")),
        Err(e) => {
            tracing::warn!(username, "login failed: {e}");
            Err(server_or(&e, "Login failed. Please check your credentials."))
        }
    }
}

/// Creates an account. Returns the confirmation message on success.
pub async fn register(session: &mut Session, form: &RegisterForm) -> Result<String, FieldErrors> {
    let errs = validate_registration(form);
    if !errs.is_empty() {
        return Err(errs);
    }

    let body = to_body(&RegisterRequest {
        username: form.username.trim().to_string(),
        email: form.email.trim().to_string(),
        password: form.password.clone(),
    })?;

    match session
        .call_public_json::<MessageResponse>(Method::POST, "/auth/register", Some(body))
        .await
    {
        Ok(_) => {
            tracing::info!(username = form.username.trim(), "account registered");
            Ok("Account created successfully! Redirecting to login...".to_string())
        }
        Err(e) => {
            tracing::warn!("registration failed: {e}");
            Err(server_or(&e, "Registration failed. Please try again."))
        }
    }
}

/// Asks the backend whether the stored token is still good. An invalid or
/// unverifiable token is dropped.
pub async fn verify_token(session: &mut Session) -> bool {
    if !session.is_authenticated() {
        return false;
    }

    match session
        .call_public_json::<serde_json::Value>(Method::GET, "/auth/verify", None)
        .await
    {
        Ok(_) => {
            session.confirm_token();
            true
        }
        Err(e) => {
            tracing::info!("token verification failed: {e}");
            session.clear_token();
            false
        }
    }
}

/// Revokes the token server-side (best effort) and returns to the login view.
pub async fn logout(session: &mut Session) {
    if session.is_authenticated() {
        if let Err(e) = session
            .call_public_json::<serde_json::Value>(Method::POST, "/auth/logout", None)
            .await
        {
            tracing::debug!("logout call failed: {e}");
        }
    }

    session.clear_token();
    session.navigate(LOGIN_PATH);
}

pub async fn forgot_password(session: &mut Session, email: &str) -> Result<String, FieldErrors> {
    let email = email.trim();
    if email.is_empty() {
        return Err(form_error("Email is required."));
    }
    if !is_valid_email(email) {
        return Err(form_error("Please enter a valid email address."));
    }

    let body = to_body(&ForgotPasswordRequest { email: email.to_string() })?;
    match session
        .call_public_json::<MessageResponse>(Method::POST, "/auth/forgot-password", Some(body))
        .await
    {
        Ok(r) if !r.message.is_empty() => Ok(r.message),
        Ok(_) => Ok("If the email exists in our system, a reset link has been sent.".to_string()),
        Err(e) => Err(server_or(&e, "Could not send reset link. Please try again.")),
    }
}

pub async fn reset_password(
    session: &mut Session,
    token: &str,
    password: &str,
    confirm: &str,
) -> Result<String, FieldErrors> {
    if token.trim().is_empty() || password.is_empty() {
        return Err(form_error("Token and password are required."));
    }
    if password.chars().count() < 8 {
        return Err(form_error("Password must be at least 8 characters long."));
    }
    if password != confirm {
        return Err(form_error("Passwords do not match."));
    }

    let body = to_body(&ResetPasswordRequest {
        token: token.trim().to_string(),
        password: password.to_string(),
    })?;

    match session
        .call_public_json::<MessageResponse>(Method::POST, "/auth/reset-password", Some(body))
        .await
    {
        Ok(r) if r.message.is_empty() => Ok("Password reset successfully".to_string()),
        Ok(r) => Ok(r.message),
        Err(e) => Err(server_or(&e, "Password reset failed. Please try again.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pw: &str, confirm: &str) -> RegisterForm {
        RegisterForm {
            username: "trader".into(),
            email: "trader@example.com".into(),
            password: pw.into(),
            confirm_password: confirm.into(),
        }
    }

    #[test]
    fn password_checks_cover_each_rule() {
        let c = PasswordChecks::of("abc");
        assert!(!c.length && !c.uppercase && c.lowercase && !c.number);
        assert!(PasswordChecks::of("Secret123").all_met());
    }

    #[test]
    fn registration_requires_every_field() {
        let errs = validate_registration(&RegisterForm::default());
        assert_eq!(errs.get("_form").map(String::as_str), Some("Please fill in all fields."));
    }

    #[test]
    fn registration_flags_weak_and_mismatched_passwords() {
        let errs = validate_registration(&form("weak", "weak2"));
        assert!(errs.contains_key("password"));
        assert!(errs.contains_key("confirmPassword"));

        assert!(validate_registration(&form("Secret123", "Secret123")).is_empty());
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("a@b.io"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.io"));
    }
}
