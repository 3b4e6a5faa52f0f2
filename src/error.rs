//! Error types for Staffdesk

use axum::{
    extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    #[error("Password hashing error: {0}")]
    Password(#[from] bcrypt::BcryptError),

    #[error("Failed to create token: {0}")]
    TokenEncoding(String),

    #[error("Config file not found. Run 'staffdesk init' first.")]
    ConfigNotFound,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Incorrect username or password")]
    IncorrectCredentials,

    #[error("Could not validate credentials")]
    InvalidCredentials,

    #[error("Token has expired")]
    TokenExpired,

    /// Token lacks one of the scopes the route asks for (space separated)
    #[error("Not enough permissions")]
    MissingScopes(String),

    /// Caller's roles do not intersect the route's ACL
    #[error("Not enough permissions")]
    PermissionDenied,

    #[error("User disabled")]
    UserDisabled,

    #[error("User not found")]
    UserNotFound,

    #[error("Employee not found")]
    EmployeeNotFound,

    #[error("Ticket not found")]
    TicketNotFound,

    #[error("{0} already registered")]
    AlreadyRegistered(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// HTTP status this error is reported with
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::NotAuthenticated
            | Error::IncorrectCredentials
            | Error::InvalidCredentials
            | Error::TokenExpired
            | Error::MissingScopes(_)
            | Error::PermissionDenied => StatusCode::UNAUTHORIZED,
            Error::UserDisabled | Error::AlreadyRegistered(_) => StatusCode::BAD_REQUEST,
            Error::UserNotFound | Error::EmployeeNotFound | Error::TicketNotFound => {
                StatusCode::NOT_FOUND
            }
            Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Value of the `WWW-Authenticate` header, if the error carries one
    fn challenge(&self) -> Option<String> {
        match self {
            Error::NotAuthenticated
            | Error::IncorrectCredentials
            | Error::InvalidCredentials
            | Error::TokenExpired => Some("Bearer".to_string()),
            Error::MissingScopes(scopes) => Some(format!("Bearer scope=\"{}\"", scopes)),
            _ => None,
        }
    }

    /// Message exposed to the client. Internal failures are not leaked.
    fn detail(&self) -> String {
        match self {
            Error::Database(_) => "Error processing database request".to_string(),
            e if e.status_code() == StatusCode::INTERNAL_SERVER_ERROR => {
                "Internal server error".to_string()
            }
            e => e.to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected ({}): {}", status, self);
        }

        let mut response = (status, Json(json!({ "detail": self.detail() }))).into_response();
        if let Some(challenge) = self.challenge() {
            if let Ok(value) = HeaderValue::from_str(&challenge) {
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, value);
            }
        }
        response
    }
}

macro_rules! rejection_as_validation {
    ($($rejection:ty),*) => {
        $(
            impl From<$rejection> for Error {
                fn from(rejection: $rejection) -> Self {
                    Error::Validation(rejection.body_text())
                }
            }
        )*
    };
}

rejection_as_validation!(JsonRejection, PathRejection, QueryRejection, FormRejection);

pub type Result<T> = std::result::Result<T, Error>;
