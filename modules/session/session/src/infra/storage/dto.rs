use pf_utils::SecretString;
use serde::{Deserialize, Serialize};
use session_sdk::{SessionCredentials, UserProfile};

/// Persisted form of the signed-in session (`auth_session` key).
#[derive(Debug, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub user: StoredUser,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StoredUser {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl From<&SessionCredentials> for StoredSession {
    fn from(c: &SessionCredentials) -> Self {
        Self {
            token: c.token.expose().to_owned(),
            user: StoredUser {
                id: c.user.id.clone(),
                email: c.user.email.clone(),
                full_name: c.user.full_name.clone(),
                role: c.user.role.clone(),
            },
        }
    }
}

impl From<StoredSession> for SessionCredentials {
    fn from(s: StoredSession) -> Self {
        SessionCredentials::new(
            SecretString::new(s.token),
            UserProfile {
                id: s.user.id,
                email: s.user.email,
                full_name: s.user.full_name,
                role: s.user.role,
            },
        )
    }
}
