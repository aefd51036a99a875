use preferences_sdk::PreferencesError;

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Validation error on field '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("Remote preferences store error: {0}")]
    Remote(#[from] PreferencesError),
}

impl DomainError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<DomainError> for PreferencesError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation { field, message } => Self::validation(field, message),
            DomainError::Remote(inner) => inner,
        }
    }
}
