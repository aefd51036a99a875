//! REST adapter for the server-held preferences record.

mod client;
mod dto;

pub use client::RestPreferencesClient;
