//! Error taxonomy shared by the store, verification and session layers.
//!
//! Callers check [`ConsoleError::is_unauthenticated`] first and hand control
//! to the login flow instead of rendering a failure.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsoleError {
    /// The control API answered 401; the session is missing or expired.
    #[error("session expired or not logged in")]
    Unauthenticated,

    /// Rejected locally before any request was made.
    #[error("{message}")]
    Validation { message: String },

    /// The control API could not be reached.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The control API answered, but not with a usable success.
    #[error("{}", format_failure(.status, .detail))]
    OperationFailed { status: Option<u16>, detail: String },

    #[error("login rejected: {message}")]
    LoginRejected { message: String },
}

fn format_failure(status: &Option<u16>, detail: &str) -> String {
    match status {
        Some(code) => format!("HTTP {code}: {detail}"),
        None => detail.to_string(),
    }
}

impl ConsoleError {
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn failed(status: Option<u16>, detail: impl Into<String>) -> Self {
        Self::OperationFailed {
            status,
            detail: detail.into(),
        }
    }

    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated)
    }
}

pub type Result<T> = std::result::Result<T, ConsoleError>;
