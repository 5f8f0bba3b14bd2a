//! Authentication error types.
//!
//! Only failures that abort a flow are errors. Rejected usernames and
//! unknown accounts are ordinary outcomes, and an unreachable hook
//! endpoint is absorbed by the hook client.

use std::fmt;

use kc_storage::StorageError;

/// Authentication operation errors.
#[derive(Debug)]
pub enum AuthError {
    /// Operator configuration is missing or unusable.
    Configuration(String),
    /// The identity store failed.
    Storage(String),
    /// Authentication flow error.
    FlowError(String),
    /// Internal error.
    Internal(String),
}

impl AuthError {
    /// Returns whether this error was caused by operator configuration.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "authenticator configuration error: {msg}"),
            Self::Storage(msg) => write!(f, "user storage error: {msg}"),
            Self::FlowError(msg) => write!(f, "authentication flow error: {msg}"),
            Self::Internal(msg) => write!(f, "internal authentication error: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<kc_core::Error> for AuthError {
    fn from(err: kc_core::Error) -> Self {
        match err {
            kc_core::Error::Config(msg) => Self::Configuration(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<StorageError> for AuthError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;
