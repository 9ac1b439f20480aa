//! Error types for the marketplace client.

use bazaar_core::validation::FieldErrors;
use thiserror::Error;

use crate::store::EntityKey;

/// Errors from a single API exchange.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("HTTP error: {0}")]
    Transport(String),

    /// No response within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The server answered with an error status.
    #[error("API error: {status} - {message}")]
    Status {
        status: u16,
        message: String,
        /// Structured field errors, when the body carried any.
        field_errors: FieldErrors,
    },

    /// The server rejected the bearer token.
    #[error("unauthorized")]
    Unauthorized,

    /// A success response whose payload did not have the expected shape.
    #[error("parse error: {0}")]
    Decode(String),

    /// A 2xx response with `success: false`.
    #[error("request failed: {message}")]
    Unsuccessful { message: String },

    /// The request body could not be serialized.
    #[error("could not encode request: {0}")]
    Encode(String),

    /// The request URL could not be built.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(error.to_string())
        }
    }
}

/// Errors surfaced to the UI by the sync coordinator.
///
/// Every variant is terminal for the user action that caused it; nothing is
/// retried.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Field-scoped errors, from local validation or a server 4xx.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// The backend could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with a non-field error.
    #[error("server error: {message}")]
    Server { status: Option<u16>, message: String },

    /// The session is gone; the user must log in again.
    #[error("session expired, please log in again")]
    Unauthorized,

    /// A mutation on the same entity is still outstanding.
    #[error("{0} is already being saved")]
    InFlight(EntityKey),

    /// The entity is not in the store.
    #[error("{0} not found")]
    NotFound(EntityKey),

    /// The payment collaborator declined or failed.
    #[error("payment failed: {0}")]
    Payment(String),
}

impl SyncError {
    /// Field errors to merge into the form, if this error is field-scoped.
    #[must_use]
    pub const fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// A single toast-level message, for errors that are not field-scoped.
    #[must_use]
    pub fn toast(&self) -> Option<String> {
        match self {
            Self::Validation(_) => None,
            Self::Network(_) => Some("Could not reach the server. Check your connection.".into()),
            Self::Server { message, .. } if !message.is_empty() => Some(message.clone()),
            Self::Server { .. } => Some("Something went wrong. Please try again.".into()),
            other => Some(other.to_string()),
        }
    }

    /// Whether the UI should send the user to the login screen.
    #[must_use]
    pub const fn requires_login(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

impl From<ApiError> for SyncError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Transport(message) => Self::Network(message),
            ApiError::Timeout => Self::Network("request timed out".into()),
            ApiError::Unauthorized => Self::Unauthorized,
            ApiError::Status {
                status,
                field_errors,
                ..
            } if (400..500).contains(&status) && !field_errors.is_empty() => {
                Self::Validation(field_errors)
            }
            ApiError::Status {
                status, message, ..
            } => Self::Server {
                status: Some(status),
                message,
            },
            ApiError::Unsuccessful { message } => Self::Server {
                status: None,
                message,
            },
            ApiError::Decode(message) => Self::Server {
                status: None,
                message: format!("unexpected response: {message}"),
            },
            ApiError::Encode(message) => Self::Server {
                status: None,
                message,
            },
            ApiError::Url(error) => Self::Network(error.to_string()),
        }
    }
}
