//! REST adapter for remote token validation.

mod dto;
mod profile_client;

pub use profile_client::RestProfileClient;
