//! Error types for Dealerdesk

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    #[error("No account for that email")]
    AccountNotFound,

    #[error("Password does not match")]
    InvalidCredential,

    #[error("Account is deactivated")]
    AccountInactive,

    #[error("Email '{0}' is already in use")]
    EmailInUse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Insufficient access level")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(String),

    #[error("Invalid token: {0}")]
    Token(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Config file not found. Run 'dealerdesk init' first.")]
    ConfigNotFound,

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<bcrypt::BcryptError> for Error {
    fn from(err: bcrypt::BcryptError) -> Self {
        Error::Internal(format!("Password hashing failed: {}", err))
    }
}

impl Error {
    /// Status code and client-visible message for this error.
    ///
    /// Login failures are collapsed into one generic message so a caller
    /// cannot tell an unknown email from a wrong password or a deactivated
    /// account. Internal details never leave the server.
    fn client_view(&self) -> (StatusCode, String) {
        match self {
            Error::AccountNotFound | Error::InvalidCredential | Error::AccountInactive => (
                StatusCode::UNAUTHORIZED,
                "Invalid email or password".to_string(),
            ),
            Error::Unauthorized | Error::Token(_) => (
                StatusCode::UNAUTHORIZED,
                "Authentication required".to_string(),
            ),
            Error::Forbidden => (
                StatusCode::FORBIDDEN,
                "Insufficient access level".to_string(),
            ),
            Error::EmailInUse(_) => (StatusCode::CONFLICT, "Email already in use".to_string()),
            Error::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Error::NotFound(what) => (StatusCode::NOT_FOUND, format!("{} not found", what)),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = self.client_view();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("request failed: {}", self);
        }

        (status, Json(crate::api::ApiResponse::<()>::err(message))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
