//! Configuration for the session module.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::validator::ValidatorConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SessionConfig {
    /// Period of the background validation, in seconds.
    pub check_interval_seconds: u64,
    /// Maximum age of a remote validation before the next check asks the
    /// backend again, in seconds.
    pub freshness_window_seconds: u64,
    /// Current-user endpoint, relative to the API base URL.
    pub profile_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            check_interval_seconds: 30 * 60,
            freshness_window_seconds: 24 * 60 * 60,
            profile_path: "/auth/me".to_owned(),
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn validator_config(&self) -> ValidatorConfig {
        ValidatorConfig {
            check_interval: Duration::from_secs(self.check_interval_seconds),
            freshness_window: Duration::from_secs(self.freshness_window_seconds),
        }
    }
}
