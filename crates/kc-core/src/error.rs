//! Error handling for Keycloak Rust.
//!
//! ## NIST 800-53 Rev5: SI-11 (Error Handling)
//!
//! Error messages are designed to be informative for operators while not
//! exposing sensitive information to end users.

use thiserror::Error;

/// Result type alias using the Keycloak error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Keycloak operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Validation error.
    #[error("validation error: {0}")]
    Validation(String),

    /// Internal error.
    #[error("internal error")]
    Internal,
}

impl Error {
    /// Creates a configuration error for a missing key.
    #[must_use]
    pub fn missing_key(key: &str) -> Self {
        Self::Config(format!("missing required key '{key}'"))
    }

    /// Returns whether this error was caused by operator configuration.
    ///
    /// Configuration errors abort a flow before any user-visible output.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
