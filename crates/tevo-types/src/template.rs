use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::version::Version;

/// Catalog identifier of a template (e.g. `structured-retail`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(String);

impl TemplateId {
    /// Wrap a catalog identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TemplateId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TemplateId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Debug for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TemplateId({})", self.0)
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What kind of change a changelog entry describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Improved,
    Fixed,
    Deprecated,
}

impl ChangeKind {
    /// Lowercase name, as serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Improved => "improved",
            Self::Fixed => "fixed",
            Self::Deprecated => "deprecated",
        }
    }
}

/// Which part of a template a changelog entry touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeCategory {
    Workflow,
    Status,
    Field,
    Report,
    Integration,
    Ui,
}

impl ChangeCategory {
    /// Lowercase name, as serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Workflow => "workflow",
            Self::Status => "status",
            Self::Field => "field",
            Self::Report => "report",
            Self::Integration => "integration",
            Self::Ui => "ui",
        }
    }
}

/// One human-readable changelog entry. Descriptive only; never applied to
/// configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionChange {
    pub kind: ChangeKind,
    pub category: ChangeCategory,
    pub description: String,
}

impl VersionChange {
    /// A changelog entry.
    pub fn new(kind: ChangeKind, category: ChangeCategory, description: impl Into<String>) -> Self {
        Self {
            kind,
            category,
            description: description.into(),
        }
    }
}

/// A published version of a template.
///
/// Releases are immutable once published; only the `is_latest` marker moves
/// when a newer release, or a patch revision of the latest one, is appended
/// to a [`ReleaseHistory`](crate::ReleaseHistory).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRelease {
    pub template_id: TemplateId,
    pub version: Version,
    pub released_at: DateTime<Utc>,
    /// Short human-readable summary of the release.
    pub summary: String,
    /// Ordered changelog.
    #[serde(default)]
    pub changes: Vec<VersionChange>,
    #[serde(default)]
    pub is_latest: bool,
}

impl TemplateRelease {
    /// Create an unpublished release with an empty changelog.
    pub fn new(
        template_id: impl Into<TemplateId>,
        version: Version,
        released_at: DateTime<Utc>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            template_id: template_id.into(),
            version,
            released_at,
            summary: summary.into(),
            changes: Vec::new(),
            is_latest: false,
        }
    }

    /// Append a changelog entry.
    pub fn with_change(mut self, change: VersionChange) -> Self {
        self.changes.push(change);
        self
    }

    /// Changelog entries of the given kind.
    pub fn changes_of_kind(&self, kind: ChangeKind) -> impl Iterator<Item = &VersionChange> {
        self.changes.iter().filter(move |c| c.kind == kind)
    }
}
