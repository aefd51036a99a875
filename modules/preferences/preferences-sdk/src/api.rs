//! `PreferencesClientV1` trait definition.

use async_trait::async_trait;

use crate::errors::PreferencesError;
use crate::models::{Preferences, PreferencesPatch};

/// Remote preferences store (Version 1).
///
/// The server copy is authoritative but latent. Implementations return a
/// fully populated record: fields missing from the server payload are filled
/// from [`Preferences::default`].
#[async_trait]
pub trait PreferencesClientV1: Send + Sync {
    /// Fetch the current user's preferences.
    async fn get_preferences(&self) -> Result<Preferences, PreferencesError>;

    /// Partially update preferences (PATCH semantics). Only `Some` fields are sent.
    async fn patch_preferences(
        &self,
        patch: PreferencesPatch,
    ) -> Result<Preferences, PreferencesError>;

    /// Replace the whole record (PUT semantics).
    async fn replace_preferences(
        &self,
        preferences: Preferences,
    ) -> Result<Preferences, PreferencesError>;
}
