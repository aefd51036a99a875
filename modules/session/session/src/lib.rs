//! Session validator.
//!
//! Holds the signed-in credentials in a write-through store and runs a
//! periodic check that signs the user out once the token has expired locally
//! or the backend refuses it.

pub mod config;
pub mod domain;
pub mod infra;

#[cfg(test)]
mod config_tests;

pub use config::SessionConfig;
pub use domain::error::DomainError;
pub use domain::repo::SessionRepository;
pub use domain::state::{SessionAction, SessionState, SessionStatus};
pub use domain::token::{TokenError, decode_expiry, is_expired};
pub use domain::validator::{SessionValidator, ValidationOutcome, ValidatorConfig};
pub use infra::rest::RestProfileClient;
pub use infra::storage::{AUTH_SESSION_KEY, LAST_VALIDATION_KEY, SessionStore};
