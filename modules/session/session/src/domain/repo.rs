use pf_utils::SecretString;
use session_sdk::SessionCredentials;
use time::OffsetDateTime;

use super::error::DomainError;

/// What the validator needs from session storage.
pub trait SessionRepository: Send + Sync {
    fn current(&self) -> Option<SessionCredentials>;

    /// Time of the last successful remote validation, if one is recorded.
    fn last_validated_at(&self) -> Option<OffsetDateTime>;

    /// Record a successful remote validation of `token`, but only if the
    /// session still holds it. Returns whether it was recorded.
    ///
    /// # Errors
    /// Returns [`DomainError`] if the timestamp cannot be persisted.
    fn record_validation_if_current(
        &self,
        token: &SecretString,
        at: OffsetDateTime,
    ) -> Result<bool, DomainError>;

    /// Clear the session, but only if it still holds `token`.
    ///
    /// Returns `false` when a different session (or none) is held, so a
    /// verdict about an old token never signs out a newer login.
    ///
    /// # Errors
    /// Returns [`DomainError`] if storage cannot be cleared.
    fn clear_if_current(&self, token: &SecretString) -> Result<bool, DomainError>;
}
