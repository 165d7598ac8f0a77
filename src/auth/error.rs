use axum::http::StatusCode;
use thiserror::Error;

/// Failures talking to the authentication service
#[derive(Debug, Error)]
pub enum AuthError {
    /// The service answered with a structured error (bad credentials, invalid token, ...)
    #[error("auth service rejected request ({status}): {}", message.as_deref().unwrap_or("no message"))]
    Remote {
        status: StatusCode,
        code: Option<String>,
        message: Option<String>,
    },

    #[error("auth service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected auth service response: {0}")]
    Decode(String),

    #[error("auth service misconfigured: {0}")]
    Config(String),

    /// A proxied path that does not resolve under the auth API
    #[error("path outside the auth api: {0}")]
    InvalidPath(String),
}

impl AuthError {
    pub fn remote(status: StatusCode, code: Option<String>, message: Option<String>) -> Self {
        AuthError::Remote { status, code, message }
    }

    /// Message suitable for showing next to a form, if the service sent one
    pub fn user_message(&self) -> Option<&str> {
        match self {
            AuthError::Remote { message, .. } => message.as_deref().filter(|m| !m.trim().is_empty()),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            AuthError::Remote { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Status to answer the browser with when this error ends a request
    pub fn response_status(&self) -> StatusCode {
        match self {
            AuthError::Remote { status, .. } if status.is_client_error() => *status,
            AuthError::InvalidPath(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::BAD_GATEWAY,
        }
    }
}
