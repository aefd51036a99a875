use std::sync::Arc;

use pf_kv_store::{KeyValueStore, StoreError};
use preferences_sdk::{Appearance, Theme};

/// Storage key of the last theme chosen on this device.
pub const THEME_KEY: &str = "theme";

/// Device-local cache of the last chosen theme.
///
/// Only the normalized appearance is written. Reads accept any theme string
/// (including `system`) and normalize it; unreadable values count as absent.
#[derive(Clone)]
pub struct LocalThemeStore {
    store: Arc<dyn KeyValueStore>,
}

impl LocalThemeStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn load(&self) -> Option<Appearance> {
        let raw = match self.store.get(THEME_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read local theme");
                return None;
            }
        };
        match raw.parse::<Theme>() {
            Ok(theme) => Some(theme.appearance()),
            Err(e) => {
                tracing::debug!(error = %e, "ignoring unreadable local theme");
                None
            }
        }
    }

    /// Persist the normalized value.
    ///
    /// # Errors
    /// Returns [`StoreError`] if the backing store rejects the write.
    pub fn save(&self, appearance: Appearance) -> Result<(), StoreError> {
        self.store.set(THEME_KEY, appearance.as_str())
    }
}

impl std::fmt::Debug for LocalThemeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalThemeStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use pf_kv_store::MemoryStore;

    #[test]
    fn round_trip_and_normalization() {
        let kv = Arc::new(MemoryStore::new());
        let local = LocalThemeStore::new(kv.clone());
        assert_eq!(local.load(), None);

        local.save(Appearance::Dark).unwrap();
        assert_eq!(kv.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
        assert_eq!(local.load(), Some(Appearance::Dark));

        kv.set(THEME_KEY, "system").unwrap();
        assert_eq!(local.load(), Some(Appearance::Light));

        kv.set(THEME_KEY, "garbage").unwrap();
        assert_eq!(local.load(), None);
    }
}
