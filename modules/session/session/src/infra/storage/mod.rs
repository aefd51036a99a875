//! Persistent session storage on top of the client key-value store.

mod dto;
mod session_store;

pub use session_store::{AUTH_SESSION_KEY, LAST_VALIDATION_KEY, SessionStore};
