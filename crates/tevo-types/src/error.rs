use thiserror::Error;

use crate::version::{Version, VersionType};

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("malformed version '{0}': expected v<major>.<minor>")]
    MalformedVersion(String),

    #[error("unknown version type '{0}': expected major, minor or patch")]
    UnknownVersionType(String),

    #[error("release {candidate} is not newer than latest release {latest}")]
    NonMonotonicRelease { latest: Version, candidate: Version },

    #[error("release {0} was already published")]
    DuplicateRelease(Version),

    #[error("no {version_type} release follows {version}: component out of range")]
    VersionOverflow {
        version: Version,
        version_type: VersionType,
    },

    #[error("release belongs to template '{actual}', history tracks '{expected}'")]
    TemplateMismatch { expected: String, actual: String },
}
