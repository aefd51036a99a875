use std::path::PathBuf;
use thiserror::Error;

/// Key-value store errors
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The in-memory snapshot could not be serialized
    #[error("failed to serialize storage snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
