//! Public models for the session module.

use pf_utils::SecretString;

/// The signed-in user as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub role: Option<String>,
}

/// Token and user of a signed-in session. They only ever exist together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCredentials {
    pub token: SecretString,
    pub user: UserProfile,
}

impl SessionCredentials {
    #[must_use]
    pub fn new(token: SecretString, user: UserProfile) -> Self {
        Self { token, user }
    }
}
