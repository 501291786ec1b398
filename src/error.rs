use std::collections::BTreeMap;

use thiserror::Error;

/// Field name -> message, rendered inline next to the form input.
/// `_form` holds errors that belong to the form as a whole.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status}{}", message_suffix(.message))]
    Status { status: u16, message: Option<String> },

    #[error("unauthorized")]
    Unauthorized,

    #[error("invalid response: {0}")]
    Decode(String),
}

fn message_suffix(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}

impl ApiError {
    /// The server-provided `message`, if the backend sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    /// Toast text: the server's message when present, the fallback otherwise.
    pub fn user_message(&self, fallback: &str) -> String {
        match self.server_message() {
            Some(m) if !m.trim().is_empty() => m.to_string(),
            _ => fallback.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Network(e.to_string())
        }
    }
}
