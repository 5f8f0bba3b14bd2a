//! End-to-End Integration Tests
//!
//! These tests drive the registration validator and the reset-credential
//! resolver the way the host flow engine does, against an in-memory user
//! store and a mock hook endpoint.

mod common;
mod registration;
mod reset_credentials;
