//! Error types for store operations.

use thiserror::Error;
use tevo_deprecation::DeprecationError;
use tevo_merge::MergeError;
use tevo_types::Version;

use crate::types::MerchantId;

/// Errors that can occur while reading or writing stored state.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The stored snapshot moved since it was read.
    #[error("snapshot for {merchant} is at {actual}, expected {expected}")]
    StaleSnapshot {
        merchant: MerchantId,
        expected: Version,
        actual: Version,
    },

    /// Nothing is stored under this key.
    #[error("not found: {name}")]
    NotFound { name: String },

    /// Something is already stored under this key and cannot be replaced.
    #[error("already exists: {name}")]
    AlreadyExists { name: String },

    /// Every compare-and-swap attempt lost to a concurrent writer.
    #[error("gave up updating {merchant} after {attempts} attempts")]
    RetriesExhausted { merchant: MerchantId, attempts: u32 },

    /// A lock guarding in-memory state was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error(transparent)]
    Deprecation(#[from] DeprecationError),
}

/// Convenience type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
