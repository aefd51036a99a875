use pf_utils::SecretString;
use session_sdk::{SessionCredentials, UserProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    SignedOut,
    SignedIn,
}

#[derive(Debug, Clone)]
pub enum SessionAction {
    Login(SessionCredentials),
    Logout,
}

/// In-memory session state.
///
/// Pure value: [`apply`](Self::apply) computes the next state and performs
/// no I/O. Token and user live in one `Option`, so they are always present
/// or absent together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    credentials: Option<SessionCredentials>,
}

impl SessionState {
    #[must_use]
    pub fn signed_in(credentials: SessionCredentials) -> Self {
        Self {
            credentials: Some(credentials),
        }
    }

    #[must_use]
    pub fn apply(self, action: SessionAction) -> Self {
        match action {
            SessionAction::Login(credentials) => Self::signed_in(credentials),
            SessionAction::Logout => Self::default(),
        }
    }

    #[must_use]
    pub fn credentials(&self) -> Option<&SessionCredentials> {
        self.credentials.as_ref()
    }

    #[must_use]
    pub fn token(&self) -> Option<&SecretString> {
        self.credentials.as_ref().map(|c| &c.token)
    }

    #[must_use]
    pub fn user(&self) -> Option<&UserProfile> {
        self.credentials.as_ref().map(|c| &c.user)
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        if self.credentials.is_some() {
            SessionStatus::SignedIn
        } else {
            SessionStatus::SignedOut
        }
    }
}
