//! # kc-storage
//!
//! Storage abstraction traits for Keycloak Rust.
//!
//! Authentication extensions never persist anything themselves; they look
//! users up through [`UserProvider`], which concrete backends implement.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod user;

pub use error::{StorageError, StorageResult};
pub use user::UserProvider;
