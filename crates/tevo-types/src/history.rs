//! Append-only release history for a single template.

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::template::{TemplateId, TemplateRelease, VersionChange};
use crate::version::{is_newer, Version};

/// Ordered, append-only list of releases for one template.
///
/// Invariants:
/// - versions never decrease in publication order;
/// - a version repeats only as a patch revision of the latest release, and
///   every revision differs from the one before it;
/// - exactly one release (the last) carries `is_latest`, unless empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseHistory {
    template_id: TemplateId,
    releases: Vec<TemplateRelease>,
}

impl ReleaseHistory {
    /// Create an empty history for a template.
    pub fn new(template_id: impl Into<TemplateId>) -> Self {
        Self {
            template_id: template_id.into(),
            releases: Vec::new(),
        }
    }

    /// Rebuild a history from stored releases, re-checking every invariant.
    ///
    /// Releases may arrive in any order; revisions of one version keep their
    /// relative order. Stored `is_latest` flags are ignored and recomputed.
    pub fn from_releases(
        template_id: impl Into<TemplateId>,
        mut releases: Vec<TemplateRelease>,
    ) -> Result<Self, TypeError> {
        releases.sort_by(|a, b| a.version.cmp(&b.version));
        let mut history = Self::new(template_id);
        for release in releases {
            history.publish(release)?;
        }
        Ok(history)
    }

    /// Template this history tracks.
    pub fn template_id(&self) -> &TemplateId {
        &self.template_id
    }

    /// Publish a release, making it the latest.
    ///
    /// A release at the latest version is a patch revision: metadata only,
    /// same identifier (see [`VersionType::Patch`](crate::VersionType::Patch)).
    /// It is appended and supersedes the earlier revision as latest.
    ///
    /// Fails if the release belongs to another template, is older than the
    /// current latest, or repeats the latest revision unchanged.
    pub fn publish(&mut self, mut release: TemplateRelease) -> Result<&TemplateRelease, TypeError> {
        if release.template_id != self.template_id {
            return Err(TypeError::TemplateMismatch {
                expected: self.template_id.to_string(),
                actual: release.template_id.to_string(),
            });
        }

        if let Some(latest) = self.releases.last_mut() {
            if latest.version == release.version {
                if latest.summary == release.summary && latest.changes == release.changes {
                    return Err(TypeError::DuplicateRelease(release.version));
                }
            } else if !is_newer(&latest.version, &release.version) {
                return Err(TypeError::NonMonotonicRelease {
                    latest: latest.version,
                    candidate: release.version,
                });
            }
            latest.is_latest = false;
        }

        release.is_latest = true;
        self.releases.push(release);
        Ok(&self.releases[self.releases.len() - 1])
    }

    /// The current latest release.
    pub fn latest(&self) -> Option<&TemplateRelease> {
        self.releases.last()
    }

    /// Look up a release by version, returning its newest revision.
    pub fn get(&self, version: &Version) -> Option<&TemplateRelease> {
        let end = self.releases.partition_point(|r| r.version <= *version);
        end.checked_sub(1)
            .map(|i| &self.releases[i])
            .filter(|r| r.version == *version)
    }

    /// Every published revision of `version`, oldest first.
    pub fn revisions(&self, version: &Version) -> &[TemplateRelease] {
        let start = self.releases.partition_point(|r| r.version < *version);
        let end = self.releases.partition_point(|r| r.version <= *version);
        &self.releases[start..end]
    }

    /// All releases, oldest first.
    pub fn releases(&self) -> &[TemplateRelease] {
        &self.releases
    }

    /// Number of published releases, revisions included.
    pub fn len(&self) -> usize {
        self.releases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }

    /// Returns `true` if a release newer than `current` exists.
    pub fn update_available_for(&self, current: &Version) -> bool {
        self.latest()
            .is_some_and(|latest| is_newer(current, &latest.version))
    }

    /// Releases in the half-open range `(from, to]`, oldest first.
    ///
    /// Only the newest revision of each version is yielded.
    pub fn releases_between(&self, from: &Version, to: &Version) -> impl Iterator<Item = &TemplateRelease> {
        let (from, to) = (*from, *to);
        let releases = &self.releases;
        releases
            .iter()
            .enumerate()
            .filter(move |(i, r)| !releases.get(i + 1).is_some_and(|n| n.version == r.version))
            .map(|(_, r)| r)
            .filter(move |r| r.version > from && r.version <= to)
    }

    /// Changelog an adopter pinned at `from` would see when moving to `to`.
    pub fn changelog_between(&self, from: &Version, to: &Version) -> Vec<&VersionChange> {
        self.releases_between(from, to)
            .flat_map(|r| r.changes.iter())
            .collect()
    }
}
