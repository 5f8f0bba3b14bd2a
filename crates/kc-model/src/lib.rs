//! # kc-model
//!
//! Domain models for Keycloak Rust.
//!
//! Authentication extensions treat these as references into the identity
//! store: they read identifiers, the enabled flag and realm login policy,
//! and fill in profile fields on newly registered users.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod realm;
pub mod user;

pub use realm::Realm;
pub use user::User;
