//! # kc-core
//!
//! Core utilities shared by the Keycloak Rust authentication extensions.
//!
//! This crate provides the error type, the audit event model and the
//! per-execution authenticator configuration consumed by `kc-auth`.
//!
//! ## NIST 800-53 Rev5 Controls
//!
//! - AU-2: Event logging framework
//! - SI-11: Error handling

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod event;

pub use config::AuthenticatorConfig;
pub use error::{Error, Result};
pub use event::{Event, EventBuilder, EventOutcome, EventType};
