use pf_kv_store::StoreError;
use session_sdk::SessionError;

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Session storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Session serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<DomainError> for SessionError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Storage(inner) => Self::storage(inner.to_string()),
            DomainError::Serialization(inner) => Self::internal(inner.to_string()),
        }
    }
}
