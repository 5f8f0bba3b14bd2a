//! # kc-auth
//!
//! Registration and credential-reset extensions for Keycloak Rust.
//!
//! This crate provides two flow executions:
//!
//! - [`RegistrationValidator`]: rejects unacceptable usernames at
//!   registration (reserved names, pattern mismatches, external veto).
//! - [`ResetCredentialChooseUser`]: resolves which account a "forgot
//!   password" request is for, with an optional external veto and a
//!   configurable disclosure policy.
//!
//! Both consult an optional HTTP hook through [`HookClient`]. The hook
//! fails open: only a successful response whose body is exactly `yes`
//! vetoes, anything else is logged and ignored.
//!
//! ## NIST 800-53 Rev5 Controls
//!
//! - IA-2: Identification and Authentication
//! - IA-5: Authenticator Management
//! - AU-2: Event logging
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use kc_auth::{HookClient, RegistrationValidator, ValidatorProfile};
//! use kc_core::AuthenticatorConfig;
//!
//! let config = AuthenticatorConfig::new()
//!     .with("profile.username.regex", "[a-z0-9_]{3,20}")
//!     .with("profile.username.invalid", "admin,root");
//! let validator = RegistrationValidator::new(
//!     ValidatorProfile::UsernameAction,
//!     &config,
//!     Arc::new(users),
//!     HookClient::with_defaults()?,
//! )?;
//! let verdict = validator.evaluate(&realm, &Candidate::username("alice")).await?;
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod authenticator;
pub mod error;
pub mod flow;
pub mod form;
pub mod hook;
pub mod resolver;
pub mod rules;
pub mod validator;

pub use authenticator::{AuthContext, Authenticator, AuthenticatorResult, FormAction};
pub use error::{AuthError, AuthResult};
pub use flow::{states, ChooseUserFlow, Denial, LookupOutcome, ResolvedIdentity};
pub use form::FormMessage;
pub use hook::{HookClient, HookResponse, HookSettings};
pub use resolver::{Resolution, ResetCredentialChooseUser, ResolverSettings};
pub use validator::{
    Candidate, RegistrationValidator, RejectReason, UsernamePolicy, ValidatorProfile, Verdict,
};
