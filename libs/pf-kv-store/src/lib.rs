#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! Client-scoped persistent key-value storage.
//!
//! The client core keeps a handful of small string values across restarts
//! (last chosen theme, serialized session, last validation timestamp).
//! Each value lives under its own key and each key has exactly one owning
//! component; this crate does not arbitrate between writers.
//!
//! Two backends are provided:
//! - [`MemoryStore`] for tests and ephemeral runs
//! - [`FileStore`] which writes through to a single JSON document on disk

mod error;
mod file;
mod memory;

pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;

/// Persistent string key-value store.
///
/// Implementations must be cheap to call from synchronous code: reads are
/// served from memory and writes complete before the call returns.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    /// Returns [`StoreError`] if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns [`StoreError`] if the value cannot be persisted.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    /// Returns [`StoreError`] if the removal cannot be persisted.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}
