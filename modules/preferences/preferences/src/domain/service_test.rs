#![cfg_attr(coverage_nightly, coverage(off))]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use pf_kv_store::{KeyValueStore, MemoryStore};
use preferences_sdk::{
    Appearance, PreferenceUpdate, Preferences, PreferencesClientV1, PreferencesError,
    PreferencesPatch, Theme,
};

use super::error::DomainError;
use super::local_theme::{LocalThemeStore, THEME_KEY};
use super::notifier::Notifier;
use super::render_root::{
    ACCENT_ATTRIBUTE, DARK_CLASS, DocumentRoot, HIGH_CONTRAST_CLASS, REDUCED_MOTION_CLASS,
    RenderRoot,
};
use super::service::{PreferencesService, ServiceConfig};
use super::theme_channel::ThemeChannel;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Get,
    Patch(PreferencesPatch),
    Replace(Box<Preferences>),
}

/// Server stand-in: keeps one record and records every request.
#[derive(Default)]
struct MockClient {
    state: Mutex<Preferences>,
    calls: Mutex<Vec<Call>>,
    fail_get: AtomicBool,
    fail_write: AtomicBool,
}

impl MockClient {
    fn with_theme(theme: Theme) -> Self {
        let client = Self::default();
        client.state.lock().theme = theme;
        client
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    fn patches(&self) -> Vec<PreferencesPatch> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                Call::Patch(p) => Some(p.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl PreferencesClientV1 for MockClient {
    async fn get_preferences(&self) -> Result<Preferences, PreferencesError> {
        self.calls.lock().push(Call::Get);
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(PreferencesError::unavailable("connection refused"));
        }
        Ok(self.state.lock().clone())
    }

    async fn patch_preferences(
        &self,
        patch: PreferencesPatch,
    ) -> Result<Preferences, PreferencesError> {
        self.calls.lock().push(Call::Patch(patch.clone()));
        if self.fail_write.load(Ordering::SeqCst) {
            return Err(PreferencesError::rejected(500, "boom"));
        }
        let mut state = self.state.lock();
        patch.apply_to(&mut state);
        Ok(state.clone())
    }

    async fn replace_preferences(
        &self,
        preferences: Preferences,
    ) -> Result<Preferences, PreferencesError> {
        self.calls
            .lock()
            .push(Call::Replace(Box::new(preferences.clone())));
        if self.fail_write.load(Ordering::SeqCst) {
            return Err(PreferencesError::rejected(500, "boom"));
        }
        *self.state.lock() = preferences.clone();
        Ok(preferences)
    }
}

#[derive(Default)]
struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl Notifier for RecordingNotifier {
    fn notify_error(&self, message: &str) {
        self.messages.lock().push(message.to_owned());
    }
}

struct Harness {
    service: PreferencesService,
    client: Arc<MockClient>,
    kv: Arc<MemoryStore>,
    root: Arc<DocumentRoot>,
    notifier: Arc<RecordingNotifier>,
}

fn harness(client: MockClient, stored_theme: Option<&str>) -> Harness {
    let client = Arc::new(client);
    let kv = Arc::new(MemoryStore::new());
    if let Some(theme) = stored_theme {
        kv.set(THEME_KEY, theme).unwrap();
    }
    let root = Arc::new(DocumentRoot::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let service = PreferencesService::new(
        client.clone(),
        LocalThemeStore::new(kv.clone()),
        root.clone(),
        ThemeChannel::new(8),
        notifier.clone(),
        ServiceConfig::default(),
    );
    Harness {
        service,
        client,
        kv,
        root,
        notifier,
    }
}

#[test]
fn stored_theme_is_painted_on_construction() {
    let h = harness(MockClient::default(), Some("dark"));
    assert!(h.root.is_dark());
    assert_eq!(h.service.local_theme(), Some(Appearance::Dark));
    assert_eq!(h.service.get_preferences().theme, Theme::Dark);
    assert!(h.client.calls().is_empty());
}

#[test]
fn get_preferences_defaults_without_remote() {
    let h = harness(MockClient::default(), None);
    assert!(!h.service.has_remote());
    assert_eq!(h.service.get_preferences(), Preferences::default());
    assert_eq!(h.service.appearance(), Appearance::Light);
}

#[tokio::test]
async fn instant_update_paints_before_network() {
    let h = harness(MockClient::default(), None);
    let mut rx = h.service.subscribe();

    h.service.update_theme_instantly(Theme::Dark);

    // Nothing has been awaited yet, so the push cannot have run.
    assert!(h.root.is_dark());
    assert_eq!(h.kv.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
    assert_eq!(rx.try_recv().unwrap(), Appearance::Dark);
    assert!(h.client.calls().is_empty());

    h.service.flush().await;
    let patches = h.client.patches();
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].theme, Some(Theme::Dark));
    assert!(h.service.has_remote());
}

#[tokio::test]
async fn system_theme_collapses_to_light() {
    let h = harness(MockClient::default(), Some("dark"));
    h.service.update_theme_instantly(Theme::System);
    assert!(!h.root.is_dark());
    assert_eq!(h.kv.get(THEME_KEY).unwrap().as_deref(), Some("light"));

    h.service.flush().await;
    assert_eq!(h.client.patches()[0].theme, Some(Theme::Light));
}

#[tokio::test]
async fn instant_light_update_clears_dark_root() {
    let h = harness(MockClient::with_theme(Theme::Dark), Some("dark"));
    assert!(h.root.is_dark());
    let mut rx = h.service.subscribe();

    h.service.update_theme_instantly(Theme::Light);

    assert!(!h.root.is_dark());
    assert!(!h.root.has_class(DARK_CLASS));
    assert_eq!(h.kv.get(THEME_KEY).unwrap().as_deref(), Some("light"));
    assert_eq!(h.service.local_theme(), Some(Appearance::Light));
    assert_eq!(rx.try_recv().unwrap(), Appearance::Light);
    assert!(h.client.calls().is_empty());

    h.service.flush().await;
    assert_eq!(h.client.patches()[0].theme, Some(Theme::Light));
    assert_eq!(h.client.state.lock().theme, Theme::Light);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn instant_update_racing_first_sync_is_never_overwritten() {
    for _ in 0..50 {
        let h = harness(MockClient::with_theme(Theme::Light), None);

        let syncing = h.service.clone();
        let toggling = h.service.clone();
        let (refreshed, toggled) = tokio::join!(
            tokio::spawn(async move { syncing.refresh().await }),
            tokio::spawn(async move { toggling.update_theme_instantly(Theme::Dark) }),
        );
        refreshed.unwrap().unwrap();
        toggled.unwrap();
        h.service.flush().await;

        assert_eq!(h.service.local_theme(), Some(Appearance::Dark));
        assert_eq!(h.kv.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
        assert!(h.root.is_dark());
        assert_eq!(h.client.state.lock().theme, Theme::Dark);
    }
}

#[test]
fn instant_update_without_runtime_skips_push() {
    let h = harness(MockClient::default(), None);
    h.service.update_theme_instantly(Theme::Dark);
    assert!(h.root.is_dark());
    assert!(h.client.calls().is_empty());
}

#[tokio::test]
async fn remote_write_failure_notifies_without_rollback() {
    let client = MockClient::default();
    client.fail_write.store(true, Ordering::SeqCst);
    let h = harness(client, None);

    h.service.update_theme_instantly(Theme::Dark);
    h.service.flush().await;

    assert!(h.root.is_dark());
    assert_eq!(h.service.local_theme(), Some(Appearance::Dark));
    assert_eq!(h.kv.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
    assert_eq!(h.notifier.messages.lock().len(), 1);
}

#[tokio::test]
async fn local_theme_wins_and_is_pushed_once() {
    let h = harness(MockClient::with_theme(Theme::Light), Some("dark"));
    let mut rx = h.service.subscribe();

    h.service.refresh().await.unwrap();
    h.service.flush().await;

    assert!(h.root.is_dark());
    let patches = h.client.patches();
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].theme, Some(Theme::Dark));
    assert_eq!(h.client.state.lock().theme, Theme::Dark);
    // Local choice was already visible: no broadcast, no silent failure notice.
    assert!(rx.try_recv().is_err());
    assert!(h.notifier.messages.lock().is_empty());
}

#[tokio::test]
async fn server_theme_is_adopted_without_local_value() {
    let h = harness(MockClient::with_theme(Theme::Dark), None);
    let mut rx = h.service.subscribe();

    let prefs = h.service.refresh().await.unwrap();
    h.service.flush().await;

    assert_eq!(prefs.theme, Theme::Dark);
    assert_eq!(h.kv.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
    assert!(h.root.is_dark());
    assert_eq!(rx.try_recv().unwrap(), Appearance::Dark);
    assert!(h.client.patches().is_empty());
}

#[tokio::test]
async fn reconcile_is_idempotent() {
    let h = harness(MockClient::with_theme(Theme::Light), Some("dark"));
    h.service.refresh().await.unwrap();
    h.service.flush().await;

    let mutations = h.root.mutation_count();
    let calls = h.client.calls().len();

    h.service.reconcile();
    h.service.reconcile();
    h.service.flush().await;

    assert_eq!(h.root.mutation_count(), mutations);
    assert_eq!(h.client.calls().len(), calls);
}

#[tokio::test]
async fn refresh_is_idempotent_for_unchanged_record() {
    let h = harness(MockClient::with_theme(Theme::Dark), Some("dark"));
    h.service.refresh().await.unwrap();
    let mutations = h.root.mutation_count();

    h.service.refresh().await.unwrap();
    h.service.flush().await;

    assert_eq!(h.root.mutation_count(), mutations);
    assert!(h.client.patches().is_empty());
}

#[tokio::test]
async fn fetch_failure_keeps_defaults() {
    let client = MockClient::default();
    client.fail_get.store(true, Ordering::SeqCst);
    let h = harness(client, None);

    let err = h.service.refresh().await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::Remote(PreferencesError::Unavailable(_))
    ));
    assert_eq!(h.service.get_preferences(), Preferences::default());
    assert!(!h.root.is_dark());
    assert_eq!(h.root.mutation_count(), 0);
}

#[tokio::test]
async fn projections_follow_server_record() {
    let client = MockClient::default();
    {
        let mut state = client.state.lock();
        state.accent_color = "teal".to_owned();
        state.high_contrast = true;
    }
    let h = harness(client, Some("light"));

    h.service.refresh().await.unwrap();
    assert_eq!(h.root.attribute(ACCENT_ATTRIBUTE).as_deref(), Some("teal"));
    assert!(h.root.has_class(HIGH_CONTRAST_CLASS));
    assert!(!h.root.has_class(REDUCED_MOTION_CLASS));

    h.service
        .update_preference(PreferenceUpdate::HighContrast(false))
        .await
        .unwrap();
    assert!(!h.root.has_class(HIGH_CONTRAST_CLASS));
}

#[tokio::test]
async fn update_preferences_with_theme_is_local_first() {
    let h = harness(MockClient::default(), Some("light"));
    let patch = PreferencesPatch {
        theme: Some(Theme::Dark),
        compact_mode: Some(true),
        ..Default::default()
    };

    let prefs = h.service.update_preferences(patch).await.unwrap();
    h.service.flush().await;

    assert!(prefs.compact_mode);
    assert_eq!(prefs.theme, Theme::Dark);
    assert!(h.root.has_class(DARK_CLASS));
    assert_eq!(h.kv.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
    assert_eq!(h.client.patches().len(), 1);
}

#[tokio::test]
async fn update_failure_notifies_and_returns_error() {
    let client = MockClient::default();
    client.fail_write.store(true, Ordering::SeqCst);
    let h = harness(client, None);

    let err = h
        .service
        .update_preference(PreferenceUpdate::Language("de".to_owned()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Remote(PreferencesError::Rejected { status: 500, .. })
    ));
    assert_eq!(h.notifier.messages.lock().len(), 1);
}

#[tokio::test]
async fn invalid_updates_are_not_sent() {
    let h = harness(MockClient::default(), None);

    let cases = [
        PreferenceUpdate::TablePageSize(0),
        PreferenceUpdate::AccentColor("  ".to_owned()),
        PreferenceUpdate::AccentColor("x".repeat(33)),
        PreferenceUpdate::CompanyDocumentsOrder(vec!["A".to_owned(), "A".to_owned()]),
    ];
    for update in cases {
        let err = h.service.update_preference(update).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }
    assert!(h.client.calls().is_empty());
    assert!(h.notifier.messages.lock().is_empty());
}

#[tokio::test]
async fn empty_patch_is_not_sent() {
    let h = harness(MockClient::default(), None);
    let prefs = h
        .service
        .update_preferences(PreferencesPatch::default())
        .await
        .unwrap();
    assert_eq!(prefs, Preferences::default());
    assert!(h.client.calls().is_empty());
}

#[tokio::test]
async fn reset_restores_baseline_and_keeps_device_theme() {
    let client = MockClient::default();
    client.state.lock().table_page_size = 50;
    let h = harness(client, Some("dark"));
    h.service.refresh().await.unwrap();
    h.service.flush().await;

    let prefs = h.service.reset_preferences().await.unwrap();

    assert_eq!(prefs.table_page_size, 10);
    assert_eq!(prefs.theme, Theme::Dark);
    let replaced = h
        .client
        .calls()
        .into_iter()
        .find_map(|c| match c {
            Call::Replace(p) => Some(p),
            _ => None,
        })
        .unwrap();
    assert_eq!(replaced.theme, Theme::Dark);
    assert_eq!(replaced.table_page_size, 10);
}

#[tokio::test]
async fn untyped_update_is_checked_before_sending() {
    let h = harness(MockClient::default(), None);

    let prefs = h
        .service
        .update_preference_value("dense_tables", serde_json::json!(true))
        .await
        .unwrap();
    assert!(prefs.dense_tables);

    let err = h
        .service
        .update_preference_value("dense_tables", serde_json::json!("yes"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));

    let err = h
        .service
        .update_preference_value("favourite_colour", serde_json::json!("red"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));
    assert_eq!(h.client.patches().len(), 1);
}
