use std::collections::HashSet;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use preferences_sdk::{
    Appearance, PreferenceUpdate, Preferences, PreferencesClientV1, PreferencesError,
    PreferencesPatch, Theme,
};
use tokio::sync::broadcast;
use tokio_util::task::TaskTracker;

use super::error::DomainError;
use super::local_theme::LocalThemeStore;
use super::notifier::Notifier;
use super::render_root::{
    ACCENT_ATTRIBUTE, DARK_CLASS, HIGH_CONTRAST_CLASS, LARGE_TEXT_CLASS, REDUCED_MOTION_CLASS,
    RenderRoot,
};
use super::theme_channel::ThemeChannel;

const THEME_SAVE_FAILED: &str = "Could not save your theme preference.";
const PREFERENCES_SAVE_FAILED: &str = "Could not save your preferences.";

// ============================================================================
// Service Configuration
// ============================================================================

pub struct ServiceConfig {
    pub max_accent_length: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_accent_length: 32,
        }
    }
}

// ============================================================================
// Service Implementation
// ============================================================================

/// Local-first preference reconciler.
///
/// Cheap to clone; clones share state. All synchronous operations complete
/// without awaiting the network. Remote writes issued by
/// [`update_theme_instantly`](Self::update_theme_instantly) and by
/// reconciliation are best-effort background tasks; [`flush`](Self::flush)
/// waits for them.
#[derive(Clone)]
pub struct PreferencesService {
    inner: Arc<Inner>,
}

struct Inner {
    client: Arc<dyn PreferencesClientV1>,
    local: LocalThemeStore,
    root: Arc<dyn RenderRoot>,
    channel: ThemeChannel,
    notifier: Arc<dyn Notifier>,
    config: ServiceConfig,

    /// Last record received from the server, already completed with defaults.
    remote: ArcSwapOption<Preferences>,
    /// Theme chosen on this device; `None` until one is stored.
    local_theme: Mutex<Option<Appearance>>,
    /// `(local, server)` inputs of the last reconciliation run.
    last_reconciled: Mutex<Option<(Option<Appearance>, Appearance)>>,
    pushes: TaskTracker,
}

impl std::fmt::Debug for PreferencesService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferencesService")
            .field("local_theme", &*self.inner.local_theme.lock())
            .field("has_remote", &self.inner.remote.load().is_some())
            .finish_non_exhaustive()
    }
}

impl PreferencesService {
    /// Build the reconciler and paint the device's last known theme.
    ///
    /// Applying the stored theme here, before any fetch, is what keeps the
    /// first frame from showing the wrong mode.
    pub fn new(
        client: Arc<dyn PreferencesClientV1>,
        local: LocalThemeStore,
        root: Arc<dyn RenderRoot>,
        channel: ThemeChannel,
        notifier: Arc<dyn Notifier>,
        config: ServiceConfig,
    ) -> Self {
        let stored = local.load();
        let service = Self {
            inner: Arc::new(Inner {
                client,
                local,
                root,
                channel,
                notifier,
                config,
                remote: ArcSwapOption::empty(),
                local_theme: Mutex::new(stored),
                last_reconciled: Mutex::new(None),
                pushes: TaskTracker::new(),
            }),
        };
        if let Some(appearance) = stored {
            service.apply_appearance(appearance);
        }
        service
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Current merged preferences. Never waits on the network.
    ///
    /// Returns the last server record, or the baseline when none has arrived,
    /// with `theme` replaced by the device's own choice when one is stored.
    #[must_use]
    pub fn get_preferences(&self) -> Preferences {
        let mut prefs = self
            .inner
            .remote
            .load_full()
            .map_or_else(Preferences::default, |remote| (*remote).clone());
        if let Some(local) = *self.inner.local_theme.lock() {
            prefs.theme = local.into();
        }
        prefs
    }

    /// The theme currently shown on this device.
    #[must_use]
    pub fn appearance(&self) -> Appearance {
        let local = *self.inner.local_theme.lock();
        local
            .or_else(|| {
                self.inner
                    .remote
                    .load()
                    .as_ref()
                    .map(|remote| remote.theme.appearance())
            })
            .unwrap_or_default()
    }

    /// Theme stored on this device, if any.
    #[must_use]
    pub fn local_theme(&self) -> Option<Appearance> {
        *self.inner.local_theme.lock()
    }

    /// `true` once a server record has been received.
    #[must_use]
    pub fn has_remote(&self) -> bool {
        self.inner.remote.load().is_some()
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Appearance> {
        self.inner.channel.subscribe()
    }

    // ------------------------------------------------------------------
    // Theme
    // ------------------------------------------------------------------

    /// Switch theme with no visible latency.
    ///
    /// In order: persist locally, update in-memory state, repaint the root
    /// marker, queue the remote write, notify subscribers. The remote write
    /// runs in the background; its failure only produces a notice.
    pub fn update_theme_instantly(&self, theme: Theme) {
        let appearance = theme.appearance();
        self.adopt_locally(appearance);
        self.spawn_theme_push(appearance, true);
        self.broadcast(appearance);
        tracing::debug!(%appearance, "theme updated");
    }

    /// Steps 1-3 of an instant update: storage, memory, root marker.
    fn adopt_locally(&self, appearance: Appearance) {
        let mut local = self.inner.local_theme.lock();
        self.write_local(&mut local, appearance);
    }

    /// Adopt the server theme unless a local one appeared since `reconcile`
    /// looked. Returns whether it was adopted.
    fn adopt_server_theme(&self, appearance: Appearance) -> bool {
        let mut local = self.inner.local_theme.lock();
        if local.is_some() {
            return false;
        }
        self.write_local(&mut local, appearance);
        true
    }

    /// Storage, memory and root are written under the `local_theme` lock so
    /// concurrent writers cannot leave them disagreeing.
    fn write_local(&self, local: &mut Option<Appearance>, appearance: Appearance) {
        if let Err(e) = self.inner.local.save(appearance) {
            tracing::warn!(error = %e, "failed to persist local theme");
        }
        *local = Some(appearance);
        self.apply_appearance(appearance);
    }

    fn broadcast(&self, appearance: Appearance) {
        let receivers = self.inner.channel.publish(appearance);
        tracing::trace!(%appearance, receivers, "theme broadcast");
    }

    fn apply_appearance(&self, appearance: Appearance) {
        if self.inner.root.is_dark() != appearance.is_dark() {
            self.inner.root.set_class(DARK_CLASS, appearance.is_dark());
        }
    }

    /// Queue a best-effort `PATCH {theme}`.
    ///
    /// `notify` controls whether a failure reaches the user; convergence
    /// pushes from reconciliation fail silently.
    fn spawn_theme_push(&self, appearance: Appearance, notify: bool) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(%appearance, "no async runtime; remote theme update skipped");
            return;
        };

        let service = self.clone();
        self.inner.pushes.spawn_on(
            async move {
                let patch = PreferencesPatch {
                    theme: Some(appearance.into()),
                    ..Default::default()
                };
                match service.inner.client.patch_preferences(patch).await {
                    Ok(remote) => service.store_remote(remote),
                    Err(e) => {
                        tracing::warn!(error = %e, %appearance, "remote theme update failed");
                        if notify {
                            service.inner.notifier.notify_error(THEME_SAVE_FAILED);
                        }
                    }
                }
            },
            &runtime,
        );
    }

    // ------------------------------------------------------------------
    // Remote sync
    // ------------------------------------------------------------------

    /// Fetch the server record, then project and reconcile it.
    ///
    /// On failure nothing changes: consumers keep the baseline or last good
    /// record and the UI stays usable offline.
    ///
    /// # Errors
    /// Returns [`DomainError::Remote`] if the fetch fails.
    pub async fn refresh(&self) -> Result<Preferences, DomainError> {
        match self.inner.client.get_preferences().await {
            Ok(remote) => {
                self.store_remote(remote);
                Ok(self.get_preferences())
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch preferences; using local defaults");
                Err(e.into())
            }
        }
    }

    /// Partially update the server record.
    ///
    /// A `theme` in the patch is also applied locally first, exactly like
    /// [`update_theme_instantly`](Self::update_theme_instantly) minus the
    /// separate push. On failure a notice is shown and nothing is rolled
    /// back.
    ///
    /// # Errors
    /// Returns [`DomainError::Validation`] for an invalid patch (nothing is
    /// sent) or [`DomainError::Remote`] if the server write fails.
    pub async fn update_preferences(
        &self,
        patch: PreferencesPatch,
    ) -> Result<Preferences, DomainError> {
        self.validate_patch(&patch)?;
        if patch.is_empty() {
            return Ok(self.get_preferences());
        }

        if let Some(theme) = patch.theme {
            let appearance = theme.appearance();
            self.adopt_locally(appearance);
            self.broadcast(appearance);
        }

        match self.inner.client.patch_preferences(patch).await {
            Ok(remote) => {
                self.store_remote(remote);
                Ok(self.get_preferences())
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to update preferences");
                self.inner.notifier.notify_error(PREFERENCES_SAVE_FAILED);
                Err(e.into())
            }
        }
    }

    /// Update a single field.
    ///
    /// # Errors
    /// See [`update_preferences`](Self::update_preferences).
    pub async fn update_preference(
        &self,
        update: PreferenceUpdate,
    ) -> Result<Preferences, DomainError> {
        tracing::debug!(key = update.key(), "updating preference");
        self.update_preferences(update.into()).await
    }

    /// Update a single field from its wire key and an untyped value.
    ///
    /// # Errors
    /// Returns [`DomainError::Validation`] for an unknown key or ill-typed
    /// value; otherwise see [`update_preferences`](Self::update_preferences).
    pub async fn update_preference_value(
        &self,
        key: &str,
        value: serde_json::Value,
    ) -> Result<Preferences, DomainError> {
        let update = PreferenceUpdate::from_json(key, value).map_err(|e| match e {
            PreferencesError::Validation { field, message } => {
                DomainError::Validation { field, message }
            }
            other => DomainError::Remote(other),
        })?;
        self.update_preference(update).await
    }

    /// Replace the server record with the baseline, keeping this device's
    /// theme.
    ///
    /// # Errors
    /// Returns [`DomainError::Remote`] if the server write fails.
    pub async fn reset_preferences(&self) -> Result<Preferences, DomainError> {
        let mut baseline = Preferences::default();
        if let Some(local) = self.local_theme() {
            baseline.theme = local.into();
        }

        match self.inner.client.replace_preferences(baseline).await {
            Ok(remote) => {
                self.store_remote(remote);
                Ok(self.get_preferences())
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to reset preferences");
                self.inner.notifier.notify_error(PREFERENCES_SAVE_FAILED);
                Err(e.into())
            }
        }
    }

    /// Wait until every queued background push has finished.
    pub async fn flush(&self) {
        self.inner.pushes.close();
        self.inner.pushes.wait().await;
        self.inner.pushes.reopen();
    }

    fn store_remote(&self, remote: Preferences) {
        self.inner.remote.store(Some(Arc::new(remote)));
        self.apply_projections();
        self.reconcile();
    }

    // ------------------------------------------------------------------
    // Reconciliation
    // ------------------------------------------------------------------

    /// Resolve the device theme against the server theme.
    ///
    /// - nothing stored locally: adopt the server value (persist, paint,
    ///   broadcast)
    /// - local differs from server: local stays visible and is pushed to the
    ///   server silently, no repaint and no broadcast
    /// - equal: make sure the root marker matches
    ///
    /// Runs with the same `(local, server)` inputs are skipped, so repeated
    /// calls neither touch the root nor hit the network.
    pub fn reconcile(&self) {
        let Some(remote) = self.inner.remote.load_full() else {
            return;
        };
        let server = remote.theme.appearance();
        let local = *self.inner.local_theme.lock();

        {
            let mut last = self.inner.last_reconciled.lock();
            if *last == Some((local, server)) {
                return;
            }
            *last = Some((local, server));
        }

        match local {
            None => {
                if self.adopt_server_theme(server) {
                    tracing::debug!(%server, "adopted server theme");
                    self.broadcast(server);
                } else {
                    // A local choice landed meanwhile; its own push converges.
                    tracing::debug!(%server, "local theme set during reconcile; kept");
                }
            }
            Some(local) if local != server => {
                tracing::debug!(%local, %server, "local theme wins; pushing to server");
                self.spawn_theme_push(local, false);
            }
            Some(local) => self.apply_appearance(local),
        }
    }

    /// One-way projection of accent color and accessibility flags from the
    /// server record onto the root. Unchanged values are not rewritten.
    fn apply_projections(&self) {
        let Some(remote) = self.inner.remote.load_full() else {
            return;
        };
        let root = &self.inner.root;

        if root.attribute(ACCENT_ATTRIBUTE).as_deref() != Some(remote.accent_color.as_str()) {
            root.set_attribute(ACCENT_ATTRIBUTE, &remote.accent_color);
        }

        for (class, enabled) in [
            (HIGH_CONTRAST_CLASS, remote.high_contrast),
            (LARGE_TEXT_CLASS, remote.large_text),
            (REDUCED_MOTION_CLASS, remote.reduced_motion),
        ] {
            if root.has_class(class) != enabled {
                root.set_class(class, enabled);
            }
        }
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    fn validate_patch(&self, patch: &PreferencesPatch) -> Result<(), DomainError> {
        if let Some(accent) = &patch.accent_color {
            let accent = accent.trim();
            if accent.is_empty() {
                return Err(DomainError::validation("accent_color", "must not be empty"));
            }
            if accent.len() > self.inner.config.max_accent_length {
                return Err(DomainError::validation(
                    "accent_color",
                    format!(
                        "exceeds maximum length of {}",
                        self.inner.config.max_accent_length
                    ),
                ));
            }
        }
        if patch.table_page_size == Some(0) {
            return Err(DomainError::validation(
                "table_page_size",
                "must be a positive integer",
            ));
        }
        for (field, order) in [
            ("company_documents_order", &patch.company_documents_order),
            ("safety_documents_order", &patch.safety_documents_order),
        ] {
            if let Some(order) = order {
                validate_order(field, order)?;
            }
        }
        Ok(())
    }
}

fn validate_order(field: &str, order: &[String]) -> Result<(), DomainError> {
    let mut seen = HashSet::with_capacity(order.len());
    for code in order {
        if !seen.insert(code.as_str()) {
            return Err(DomainError::validation(
                field,
                format!("duplicate document code '{code}'"),
            ));
        }
    }
    Ok(())
}
