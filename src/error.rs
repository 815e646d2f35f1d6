//! Error types for branch reconciliation.
//!
//! Errors fall into three categories: configuration problems caught before
//! any remote call, failures returned by the remote API, and failures while
//! mapping a fetched entity into local state. None of them are retried or
//! recovered internally; retry and backoff belong to the HTTP client's
//! caller.

use std::fmt;

/// Result type alias for branch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of branch reconciliation errors.
///
/// The category tells the caller where an error originated: in local input
/// checking, in the remote API, or in the translation of a remote entity
/// into local state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Conflicting or invalid input, detected before any remote call.
    Config,
    /// Failure returned by the remote API, opaque to this crate.
    Remote,
    /// Failure while writing a fetched field into local state.
    Mapping,
}

impl ErrorCategory {
    /// Whether errors of this category are raised without a remote round trip.
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Config | Self::Mapping)
    }

    /// Get a short description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Config => "Invalid or conflicting configuration",
            Self::Remote => "Remote API failure",
            Self::Mapping => "Remote state could not be mapped",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur during branch reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Two mutually exclusive attributes were both set.
    #[error("{first} conflicts with {second}")]
    ConflictingFields {
        /// First attribute of the exclusive pair.
        first: &'static str,
        /// Second attribute of the exclusive pair.
        second: &'static str,
    },

    /// An attribute that must be non-negative carried a negative value.
    #[error("{field} must be not negative, got {value}")]
    NegativeValue {
        /// Offending attribute name.
        field: &'static str,
        /// The rejected value.
        value: i64,
    },

    /// An attribute value could not be used to build a request.
    #[error("invalid value for {field}: {message}")]
    InvalidValue {
        /// Offending attribute name.
        field: &'static str,
        /// What was wrong with it.
        message: String,
    },

    /// The remote API returned a failure.
    #[error("remote API error: {message}")]
    Api {
        /// Error message as reported by the client or the remote.
        message: String,
        /// HTTP status code if available.
        status: Option<u16>,
    },

    /// The remote response body could not be decoded.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),

    /// A fetched remote field could not be written into local state.
    #[error("failed to map remote field {field}: {message}")]
    Mapping {
        /// Remote field being mapped.
        field: &'static str,
        /// What went wrong.
        message: String,
    },

    /// Import aborted; carries the first underlying diagnostic's message as
    /// the sole error text.
    #[error("{0}")]
    ImportFailed(String),
}

impl Error {
    /// Create a remote API error.
    pub fn api(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Api {
            message: message.into(),
            status,
        }
    }

    /// Create a mapping error for a remote field.
    pub fn mapping(field: &'static str, message: impl Into<String>) -> Self {
        Self::Mapping {
            field,
            message: message.into(),
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::ConflictingFields { .. }
            | Error::NegativeValue { .. }
            | Error::InvalidValue { .. } => ErrorCategory::Config,
            Error::Api { .. } | Error::InvalidResponse(_) | Error::ImportFailed(_) => {
                ErrorCategory::Remote
            }
            Error::Mapping { .. } => ErrorCategory::Mapping,
        }
    }

    /// Whether this error is a remote not-found condition.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Api { status: Some(404), .. })
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::Api {
                message: format!("HTTP {}", code),
                status: Some(code),
            },
            other => Self::Api {
                message: other.to_string(),
                status: None,
            },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}
