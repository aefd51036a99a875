//! Configuration for the preferences module.

use serde::{Deserialize, Serialize};

use crate::domain::service::ServiceConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PreferencesConfig {
    /// Buffered theme events per subscriber before it lags.
    pub channel_capacity: usize,
    /// Maximum length of an accent color token.
    pub max_accent_length: usize,
    /// Path of the preferences resource, relative to the API base URL.
    pub preferences_path: String,
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 16,
            max_accent_length: 32,
            preferences_path: "/preferences".to_owned(),
        }
    }
}

impl PreferencesConfig {
    #[must_use]
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            max_accent_length: self.max_accent_length,
        }
    }
}
