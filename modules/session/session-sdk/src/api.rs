//! `ProfileClientV1` trait definition.

use async_trait::async_trait;
use pf_utils::SecretString;

use crate::errors::SessionError;
use crate::models::UserProfile;

/// Remote "who am I" endpoint, used to confirm a token is still accepted.
#[async_trait]
pub trait ProfileClientV1: Send + Sync {
    /// Fetch the profile of the user owning `token`.
    ///
    /// A definitive refusal is [`SessionError::Rejected`]; anything that
    /// prevented an answer is [`SessionError::Unavailable`].
    async fn current_user(&self, token: &SecretString) -> Result<UserProfile, SessionError>;
}
