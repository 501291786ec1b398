use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Response,
    Extension, Form,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::{
    auth::AuthToken,
    commands::Action,
    controllers::{fragment_response, page_response, run, Screen},
    services::auth_service::RegisterForm,
    AppState,
};

const LOGIN: Screen = Screen {
    page: "pages/login",
    title: "Login",
    nav: "login",
};

const REGISTER: Screen = Screen {
    page: "pages/register",
    title: "Register",
    nav: "register",
};

const FORGOT: Screen = Screen {
    page: "pages/forgot_password",
    title: "Forgot Password",
    nav: "login",
};

const RESET: Screen = Screen {
    page: "pages/reset_password",
    title: "Reset Password",
    nav: "login",
};

// ---------------- LOGIN ----------------

/// A browser that still holds a valid token goes straight to the dashboard.
pub async fn get_login(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    token: Option<Extension<AuthToken>>,
) -> Response {
    let handled = run(&state, token, Action::VerifyToken).await;
    page_response(&state, &headers, jar, handled, LOGIN)
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

pub async fn post_login(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    token: Option<Extension<AuthToken>>,
    Form(form): Form<LoginForm>,
) -> Response {
    let action = Action::Login {
        username: form.username,
        password: form.password,
    };
    let handled = run(&state, token, action).await;
    fragment_response(&state, &headers, jar, handled, LOGIN)
}

// ---------------- REGISTER ----------------

pub async fn get_register(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Response {
    let handled = run(&state, None, Action::ShowRegister).await;
    page_response(&state, &headers, jar, handled, REGISTER)
}

pub async fn post_register(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Response {
    let handled = run(&state, None, Action::Register(form)).await;
    fragment_response(&state, &headers, jar, handled, REGISTER)
}

// ---------------- LOGOUT ----------------

pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    token: Option<Extension<AuthToken>>,
) -> Response {
    let handled = run(&state, token, Action::Logout).await;
    fragment_response(&state, &headers, jar, handled, LOGIN)
}

// ---------------- PASSWORD RESET ----------------

pub async fn get_forgot_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Response {
    let handled = run(&state, None, Action::ShowForgotPassword).await;
    page_response(&state, &headers, jar, handled, FORGOT)
}

#[derive(Deserialize)]
pub struct ForgotPasswordForm {
    #[serde(default)]
    pub email: String,
}

pub async fn post_forgot_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Form(form): Form<ForgotPasswordForm>,
) -> Response {
    let handled = run(&state, None, Action::ForgotPassword { email: form.email }).await;
    fragment_response(&state, &headers, jar, handled, FORGOT)
}

#[derive(Deserialize)]
pub struct ResetQuery {
    #[serde(default)]
    pub token: String,
}

pub async fn get_reset_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Query(q): Query<ResetQuery>,
) -> Response {
    let handled = run(&state, None, Action::ShowResetPassword { token: q.token }).await;
    page_response(&state, &headers, jar, handled, RESET)
}

#[derive(Deserialize)]
pub struct ResetPasswordForm {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, rename = "confirmPassword")]
    pub confirm_password: String,
}

pub async fn post_reset_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Form(form): Form<ResetPasswordForm>,
) -> Response {
    let action = Action::ResetPassword {
        token: form.token,
        password: form.password,
        confirm: form.confirm_password,
    };
    let handled = run(&state, None, action).await;
    fragment_response(&state, &headers, jar, handled, RESET)
}
