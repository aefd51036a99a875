use std::sync::Arc;

use parking_lot::RwLock;
use pf_http::BearerSource;
use pf_kv_store::KeyValueStore;
use pf_utils::{SecretString, epoch_millis};
use session_sdk::SessionCredentials;
use time::OffsetDateTime;
use tokio::sync::watch;

use super::dto::StoredSession;
use crate::domain::error::DomainError;
use crate::domain::repo::SessionRepository;
use crate::domain::state::{SessionAction, SessionState, SessionStatus};

/// Storage key of the serialized token and user.
pub const AUTH_SESSION_KEY: &str = "auth_session";
/// Storage key of the last remote validation, epoch milliseconds.
pub const LAST_VALIDATION_KEY: &str = "last_token_validation";

/// Write-through adapter around [`SessionState`].
///
/// Every transition is computed by the pure reducer, persisted, and only
/// then published to readers and to [`watch`](Self::watch) subscribers.
pub struct SessionStore {
    kv: Arc<dyn KeyValueStore>,
    state: RwLock<SessionState>,
    status: watch::Sender<SessionStatus>,
}

impl SessionStore {
    /// Restore the session persisted in `kv`.
    ///
    /// An unreadable blob is removed and the store starts signed out.
    pub fn open(kv: Arc<dyn KeyValueStore>) -> Self {
        let state = match load(kv.as_ref()) {
            Ok(Some(credentials)) => SessionState::signed_in(credentials),
            Ok(None) => SessionState::default(),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable stored session");
                if let Err(e) = kv.remove(AUTH_SESSION_KEY) {
                    tracing::warn!(error = %e, "failed to remove unreadable session");
                }
                SessionState::default()
            }
        };
        let (status, _) = watch::channel(state.status());
        Self {
            kv,
            state: RwLock::new(state),
            status,
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.read().clone()
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.state.read().status()
    }

    /// Status changes, for the login surface to react to sign-outs.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    /// Store a new session and start a fresh validation window.
    ///
    /// # Errors
    /// Returns [`DomainError`] if the session cannot be persisted; memory
    /// and storage are both left as they were in that case.
    pub fn login(&self, credentials: SessionCredentials) -> Result<(), DomainError> {
        let mut state = self.state.write();
        let blob = serde_json::to_string(&StoredSession::from(&credentials))?;
        let previous = self.kv.get(AUTH_SESSION_KEY)?;
        self.kv.set(AUTH_SESSION_KEY, &blob)?;
        if let Err(e) = self.write_validation(OffsetDateTime::now_utc()) {
            self.restore_blob(previous.as_deref());
            return Err(e);
        }

        *state = std::mem::take(&mut *state).apply(SessionAction::Login(credentials));
        self.publish(state.status());
        tracing::info!("session stored");
        Ok(())
    }

    /// Sign out: drop the session from memory and storage.
    ///
    /// Memory is cleared first, so the user is signed out even if storage
    /// fails.
    ///
    /// # Errors
    /// Returns [`DomainError`] if a storage key cannot be removed.
    pub fn logout(&self) -> Result<(), DomainError> {
        let mut state = self.state.write();
        self.clear_locked(&mut state)
    }

    fn clear_locked(&self, state: &mut SessionState) -> Result<(), DomainError> {
        *state = std::mem::take(state).apply(SessionAction::Logout);
        self.publish(state.status());

        let session = self.kv.remove(AUTH_SESSION_KEY);
        let validation = self.kv.remove(LAST_VALIDATION_KEY);
        session?;
        validation?;
        Ok(())
    }

    /// Put back the blob that matches the unchanged in-memory state.
    fn restore_blob(&self, previous: Option<&str>) {
        let restored = match previous {
            Some(blob) => self.kv.set(AUTH_SESSION_KEY, blob),
            None => self.kv.remove(AUTH_SESSION_KEY),
        };
        if let Err(e) = restored {
            tracing::error!(error = %e, "failed to roll back stored session after failed login");
        }
    }

    fn write_validation(&self, at: OffsetDateTime) -> Result<(), DomainError> {
        self.kv
            .set(LAST_VALIDATION_KEY, &epoch_millis(at).to_string())?;
        Ok(())
    }

    fn publish(&self, status: SessionStatus) {
        self.status.send_if_modified(|current| {
            let changed = *current != status;
            *current = status;
            changed
        });
    }
}

fn load(kv: &dyn KeyValueStore) -> Result<Option<SessionCredentials>, DomainError> {
    let Some(raw) = kv.get(AUTH_SESSION_KEY)? else {
        return Ok(None);
    };
    let stored: StoredSession = serde_json::from_str(&raw)?;
    if stored.token.is_empty() {
        return Ok(None);
    }
    Ok(Some(stored.into()))
}

impl SessionRepository for SessionStore {
    fn current(&self) -> Option<SessionCredentials> {
        self.state.read().credentials().cloned()
    }

    fn last_validated_at(&self) -> Option<OffsetDateTime> {
        let raw = match self.kv.get(LAST_VALIDATION_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read last token validation");
                return None;
            }
        };
        let millis: i64 = raw.trim().parse().ok()?;
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000).ok()
    }

    fn record_validation_if_current(
        &self,
        token: &SecretString,
        at: OffsetDateTime,
    ) -> Result<bool, DomainError> {
        let state = self.state.read();
        if state.token() != Some(token) {
            return Ok(false);
        }
        self.write_validation(at)?;
        Ok(true)
    }

    fn clear_if_current(&self, token: &SecretString) -> Result<bool, DomainError> {
        let mut state = self.state.write();
        if state.token() != Some(token) {
            return Ok(false);
        }
        self.clear_locked(&mut state)?;
        Ok(true)
    }
}

impl BearerSource for SessionStore {
    fn bearer_token(&self) -> Option<SecretString> {
        self.state.read().token().cloned()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}
