use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use pf_utils::SecretString;
use session_sdk::ProfileClientV1;
use time::OffsetDateTime;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::repo::SessionRepository;
use super::token;

/// Result of one validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// No credential held; nothing to do.
    NoSession,
    /// Unexpired and remotely validated within the freshness window.
    Fresh,
    /// Unexpired; the backend just confirmed it.
    Revalidated,
    /// Expired or undecodable; the session was cleared.
    Expired,
    /// The backend refused the token; the session was cleared.
    Rejected,
    /// The backend could not be reached; the session was kept.
    Unreachable,
}

impl ValidationOutcome {
    /// Whether the held session may be used for a sensitive action.
    ///
    /// `Unreachable` counts as usable: a transient network failure says
    /// nothing about the token.
    #[must_use]
    pub fn is_usable(self) -> bool {
        matches!(self, Self::Fresh | Self::Revalidated | Self::Unreachable)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Period of the background check.
    pub check_interval: Duration,
    /// Maximum age of a remote validation before another one is needed.
    pub freshness_window: Duration,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(30 * 60),
            freshness_window: Duration::from_secs(24 * 60 * 60),
        }
    }
}

struct RunningTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Periodic and on-demand session validation.
///
/// Owned by the composition root, which calls [`start`](Self::start) once
/// and [`stop`](Self::stop) at shutdown. At most one background task runs.
pub struct SessionValidator<R: SessionRepository> {
    repo: Arc<R>,
    profiles: Arc<dyn ProfileClientV1>,
    config: ValidatorConfig,
    task: Mutex<Option<RunningTask>>,
}

impl<R: SessionRepository + 'static> std::fmt::Debug for SessionValidator<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionValidator")
            .field("config", &self.config)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl<R: SessionRepository + 'static> SessionValidator<R> {
    pub fn new(repo: Arc<R>, profiles: Arc<dyn ProfileClientV1>, config: ValidatorConfig) -> Self {
        Self {
            repo,
            profiles,
            config,
            task: Mutex::new(None),
        }
    }

    /// One validation pass.
    ///
    /// No credential: nothing happens. Expired token: the session is cleared
    /// without asking the backend. Otherwise the backend is asked only when
    /// the last remote validation is missing or older than the freshness
    /// window.
    pub async fn tick(&self) -> ValidationOutcome {
        let Some(credentials) = self.repo.current() else {
            return ValidationOutcome::NoSession;
        };

        let now = OffsetDateTime::now_utc();
        if token::is_expired(credentials.token.expose(), now) {
            self.clear(&credentials.token, "token expired");
            return ValidationOutcome::Expired;
        }

        if self.is_fresh(now) {
            return ValidationOutcome::Fresh;
        }

        match self.profiles.current_user(&credentials.token).await {
            Ok(_) => {
                match self
                    .repo
                    .record_validation_if_current(&credentials.token, OffsetDateTime::now_utc())
                {
                    Ok(true) => tracing::debug!("token revalidated"),
                    Ok(false) => tracing::debug!("session changed during validation; not recorded"),
                    Err(e) => tracing::warn!(error = %e, "failed to record token validation"),
                }
                ValidationOutcome::Revalidated
            }
            Err(e) if e.is_rejection() => {
                self.clear(&credentials.token, "token rejected by server");
                ValidationOutcome::Rejected
            }
            Err(e) => {
                tracing::warn!(error = %e, "token validation inconclusive; keeping session");
                ValidationOutcome::Unreachable
            }
        }
    }

    /// On-demand check before a sensitive action. Does not touch the timer.
    pub async fn validate_session_now(&self) -> bool {
        self.tick().await.is_usable()
    }

    fn is_fresh(&self, now: OffsetDateTime) -> bool {
        let Some(last) = self.repo.last_validated_at() else {
            return false;
        };
        let window =
            time::Duration::try_from(self.config.freshness_window).unwrap_or(time::Duration::MAX);
        now - last < window
    }

    fn clear(&self, token: &SecretString, reason: &'static str) {
        match self.repo.clear_if_current(token) {
            Ok(true) => tracing::info!(reason, "session cleared"),
            Ok(false) => tracing::debug!(reason, "session changed during validation; kept"),
            Err(e) => tracing::error!(error = %e, reason, "failed to clear session"),
        }
    }

    /// Start the background check, replacing any running one.
    ///
    /// The first pass runs immediately. Must be called within a Tokio
    /// runtime; without one the call logs and does nothing.
    pub fn start(self: &Arc<Self>) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("no async runtime; session validator not started");
            return;
        };

        let mut task = self.task.lock();
        if let Some(previous) = task.take() {
            previous.cancel.cancel();
        }

        let cancel = CancellationToken::new();
        let handle = runtime.spawn(Arc::clone(self).run(cancel.clone()));
        *task = Some(RunningTask { cancel, handle });
        tracing::info!(
            interval_secs = self.config.check_interval.as_secs(),
            "session validator started"
        );
    }

    /// Cancel the background check. Safe to call when not running.
    pub fn stop(&self) {
        if let Some(task) = self.task.lock().take() {
            task.cancel.cancel();
        }
    }

    /// [`stop`](Self::stop) and wait for the task to exit.
    pub async fn shutdown(&self) {
        let task = self.task.lock().take();
        if let Some(task) = task {
            task.cancel.cancel();
            if let Err(e) = task.handle.await {
                tracing::warn!(error = %e, "session validator task ended abnormally");
            }
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|task| !task.handle.is_finished())
    }

    async fn run(self: Arc<Self>, cancel: CancellationToken) {
        let period = self.config.check_interval.max(Duration::from_millis(1));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    tracing::info!("session validator shutting down");
                    break;
                }
                _ = interval.tick() => {
                    let outcome = self.tick().await;
                    tracing::debug!(?outcome, "session check finished");
                }
            }
        }
    }
}
