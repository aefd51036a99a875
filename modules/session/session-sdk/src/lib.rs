//! Session SDK
//!
//! This crate provides the public contract of the session module:
//! - `ProfileClientV1` trait for remote token validation
//! - Model types (`UserProfile`, `SessionCredentials`)
//! - Error type (`SessionError`)

#![forbid(unsafe_code)]

pub mod api;
pub mod errors;
pub mod models;

pub use api::ProfileClientV1;
pub use errors::SessionError;
pub use models::{SessionCredentials, UserProfile};
