//! Error types for the merge crate.

use tevo_types::Version;

/// Errors that can occur while building or merging configuration.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MergeError {
    /// A dotted path was empty or contained an empty segment.
    #[error("invalid path '{0}': expected dot-separated, non-empty segments")]
    InvalidPath(String),

    /// Applying the change would replace an existing value with a different
    /// shape (e.g. descend through a scalar, or overwrite a record).
    #[error("path '{path}' conflicts with existing value at '{at}'")]
    PathConflict { path: String, at: String },

    /// The snapshot is pinned outside the update's `from..=to` window.
    #[error("snapshot pinned to {pinned} cannot take update {from} -> {to}")]
    VersionOutOfRange {
        pinned: Version,
        from: Version,
        to: Version,
    },

    /// Configuration root must be an object.
    #[error("configuration root must be an object, got {0}")]
    NotAnObject(&'static str),

    /// A merge result dropped a path that the input snapshot held.
    #[error("merge would remove '{path}' from the snapshot")]
    RemovedPath { path: String },

    /// The update failed validation or still carries unresolved warnings.
    #[error("update rejected: {0}")]
    Validation(String),
}

/// Convenience alias for merge results.
pub type MergeResult<T> = Result<T, MergeError>;
