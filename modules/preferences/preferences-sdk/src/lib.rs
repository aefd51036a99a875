//! Preferences SDK
//!
//! This crate provides the public contract of the preferences module:
//! - `PreferencesClientV1` trait for the remote (server-persisted) preferences store
//! - Model types (`Preferences`, `PreferencesPatch`, `PreferenceUpdate`, `Theme`, `Appearance`)
//! - Error type (`PreferencesError`)
//!
//! ```ignore
//! let client: Arc<dyn PreferencesClientV1> = Arc::new(RestPreferencesClient::new(http, bearer));
//! let prefs = client.get_preferences().await?;
//! ```

#![forbid(unsafe_code)]

pub mod api;
pub mod errors;
pub mod models;

pub use api::PreferencesClientV1;
pub use errors::PreferencesError;
pub use models::{
    Appearance, FormValidationMode, PreferenceUpdate, Preferences, PreferencesPatch, Theme,
    UnknownVariant,
};
