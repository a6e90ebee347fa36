//! Error types for deprecation record changes.

use chrono::{DateTime, Utc};
use tevo_types::TemplateId;

/// Errors raised when evolving a deprecation record.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DeprecationError {
    /// A template cannot be its own replacement.
    #[error("template '{0}' cannot replace itself")]
    SelfReplacement(TemplateId),

    /// End-of-life must not precede the deprecation itself.
    #[error("end of life {end_of_life} is before deprecation at {deprecated_at}")]
    EndOfLifeBeforeDeprecation {
        deprecated_at: DateTime<Utc>,
        end_of_life: DateTime<Utc>,
    },
}

/// Convenience alias for deprecation results.
pub type DeprecationResult<T> = Result<T, DeprecationError>;
