//! Login form model.
//!
//! Field names, message keys and page identifiers shared with the host's
//! theme. Messages are keys into the theme's message bundle; rendering and
//! localisation happen in the host.

use serde::{Deserialize, Serialize};

/// Form field names.
pub mod fields {
    /// Username input.
    pub const USERNAME: &str = "username";
    /// Email input.
    pub const EMAIL: &str = "email";
    /// First name input.
    pub const FIRST_NAME: &str = "firstName";
    /// Last name input.
    pub const LAST_NAME: &str = "lastName";
}

/// Message bundle keys.
pub mod messages {
    /// Username was left empty.
    pub const MISSING_USERNAME: &str = "missingUsernameMessage";
    /// Email was left empty.
    pub const MISSING_EMAIL: &str = "missingEmailMessage";
    /// First name was left empty.
    pub const MISSING_FIRST_NAME: &str = "missingFirstNameMessage";
    /// Last name was left empty.
    pub const MISSING_LAST_NAME: &str = "missingLastNameMessage";
    /// Email is malformed.
    pub const INVALID_EMAIL: &str = "invalidEmailMessage";
    /// Email already belongs to another account.
    pub const EMAIL_EXISTS: &str = "emailExistsMessage";
    /// Username is on the denylist.
    pub const USERNAME_NOT_AVAILABLE: &str = "usernameNotAvailable";
    /// Username does not match the configured pattern.
    pub const INVALID_USERNAME_CHARACTERS: &str = "invalidUsernameCharacters";
    /// Registration vetoed by the external hook.
    pub const REGISTRATION_PREVENTED_EXTERNAL: &str = "RegistrationPreventedExternallyMessage";
    /// Credential reset vetoed by the external hook.
    pub const RESET_PASSWORD_PREVENTED_EXTERNAL: &str = "ResetPasswordPreventedExternallyMessage";
    /// No account matched the identifier.
    pub const INVALID_USER: &str = "invalidUserMessage";
    /// The matched account is disabled.
    pub const ACCOUNT_DISABLED: &str = "accountDisabledMessage";
}

/// Page identifiers the host renders on a challenge.
pub mod pages {
    /// Registration form.
    pub const REGISTER: &str = "register";
    /// "Forgot password" identifier form.
    pub const RESET_PASSWORD: &str = "login-reset-password";
}

/// A message attached to one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormMessage {
    /// Field the message is shown next to.
    pub field: String,
    /// Message bundle key.
    pub message: String,
}

impl FormMessage {
    /// Creates a field-scoped message.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}
