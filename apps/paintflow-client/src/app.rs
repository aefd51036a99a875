use std::sync::Arc;

use anyhow::{Context, Result};
use pf_http::HttpClient;
use pf_kv_store::{FileStore, KeyValueStore, MemoryStore};
use preferences::{
    DocumentRoot, LocalThemeStore, PreferencesService, RestPreferencesClient, ThemeChannel,
    TracingNotifier,
};
use session::{RestProfileClient, SessionStore, SessionValidator};

use crate::config::AppConfig;

/// Everything the client core consists of, wired once at startup.
pub struct ClientCore {
    pub session: Arc<SessionStore>,
    pub validator: Arc<SessionValidator<SessionStore>>,
    pub preferences: PreferencesService,
    pub root: Arc<DocumentRoot>,
}

impl ClientCore {
    /// # Errors
    /// Fails if storage cannot be opened or the HTTP client cannot be built.
    pub fn build(config: &AppConfig) -> Result<Self> {
        let kv = open_storage(config)?;
        let http = HttpClient::new(config.api.http_config()).context("failed to build HTTP client")?;

        let session = Arc::new(SessionStore::open(kv.clone()));
        let profiles = Arc::new(RestProfileClient::new(
            http.clone(),
            &config.session.profile_path,
        ));
        let validator = Arc::new(SessionValidator::new(
            session.clone(),
            profiles,
            config.session.validator_config(),
        ));

        let remote = Arc::new(RestPreferencesClient::new(
            http,
            session.clone(),
            &config.preferences.preferences_path,
        ));
        let root = Arc::new(DocumentRoot::new());
        let preferences = PreferencesService::new(
            remote,
            LocalThemeStore::new(kv),
            root.clone(),
            ThemeChannel::new(config.preferences.channel_capacity),
            Arc::new(TracingNotifier),
            config.preferences.service_config(),
        );

        Ok(Self {
            session,
            validator,
            preferences,
            root,
        })
    }
}

fn open_storage(config: &AppConfig) -> Result<Arc<dyn KeyValueStore>> {
    if config.storage.in_memory {
        tracing::debug!("using in-memory storage");
        return Ok(Arc::new(MemoryStore::new()));
    }
    let path = config.storage.resolved_path()?;
    let store = FileStore::open(&path)
        .with_context(|| format!("failed to open storage at {}", path.display()))?;
    tracing::debug!(path = %path.display(), "storage opened");
    Ok(Arc::new(store))
}
