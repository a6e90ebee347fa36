//! Additive merge of a template update into a merchant snapshot.
//!
//! The input snapshot is never modified. Each change folds into a new
//! [`ConfigTree`] that shares every untouched branch with its predecessor:
//!
//! - `add` creates the path if missing and leaves an existing node untouched;
//! - `modify` overlays its value onto an existing node, unless `optional`;
//! - `deprecate` is informational and never touches the tree.
//!
//! An update made only of optional modifications returns the input snapshot,
//! version included.

use serde::Serialize;
use tevo_types::{is_newer, Version};

use crate::change::{ChangeType, TemplateUpdate};
use crate::diff::ensure_additive;
use crate::error::{MergeError, MergeResult};
use crate::path::ConfigPath;
use crate::tree::{ConfigNode, ConfigSnapshot, ConfigTree};

/// A merged snapshot plus what happened to each change, by index.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MergeOutcome {
    pub snapshot: ConfigSnapshot,
    /// Changes that altered the configuration.
    pub applied: Vec<usize>,
    /// Changes whose result was already present.
    pub unchanged: Vec<usize>,
    /// Optional modifications awaiting explicit acceptance by the adopter.
    pub deferred: Vec<usize>,
    /// Modifications whose target does not exist in this snapshot.
    pub skipped: Vec<usize>,
    /// Deprecations, surfaced to the adopter but not applied.
    pub informational: Vec<usize>,
}

/// Merge `update` into `snapshot`, returning the new snapshot.
///
/// Callers must validate the update first; see
/// [`ValidationReport::ensure_applicable`](crate::ValidationReport::ensure_applicable).
pub fn merge(snapshot: &ConfigSnapshot, update: &TemplateUpdate) -> MergeResult<ConfigSnapshot> {
    merge_detailed(snapshot, update).map(|outcome| outcome.snapshot)
}

/// Merge `update` into `snapshot`, reporting the fate of every change.
///
/// The snapshot must be pinned within `update.from..=update.to`; a snapshot
/// already at `update.to` takes the update again as a no-op for everything it
/// already has. The result is pinned to `update.to`, except when every change
/// was deferred: the input snapshot then comes back unchanged.
pub fn merge_detailed(snapshot: &ConfigSnapshot, update: &TemplateUpdate) -> MergeResult<MergeOutcome> {
    let pinned = snapshot.version;
    if pinned < update.from || pinned > update.to {
        return Err(MergeError::VersionOutOfRange {
            pinned,
            from: update.from,
            to: update.to,
        });
    }

    let mut config = snapshot.config.clone();
    let mut applied = Vec::new();
    let mut unchanged = Vec::new();
    let mut deferred = Vec::new();
    let mut skipped = Vec::new();
    let mut informational = Vec::new();

    for (index, change) in update.changes.iter().enumerate() {
        let path = ConfigPath::parse(&change.path)?;

        let next = match change.change_type {
            ChangeType::Add => {
                let node = change
                    .value
                    .as_ref()
                    .map(ConfigNode::from_value)
                    .unwrap_or_else(|| ConfigNode::Branch(ConfigTree::new()));
                config.with_created(&path, &node)?
            }
            ChangeType::Modify if change.optional => {
                tracing::debug!(%path, "optional modification deferred");
                deferred.push(index);
                continue;
            }
            ChangeType::Modify if !config.contains(&path) => {
                tracing::warn!(%path, "modification target missing from snapshot, skipped");
                skipped.push(index);
                continue;
            }
            ChangeType::Modify => match &change.value {
                Some(overlay) => config.with_overlay(&path, overlay)?,
                None => None,
            },
            ChangeType::Deprecate => {
                tracing::debug!(%path, "deprecation noted, snapshot untouched");
                informational.push(index);
                continue;
            }
        };

        match next {
            Some(tree) => {
                tracing::debug!(%path, change_type = %change.change_type, "change applied");
                config = tree;
                applied.push(index);
            }
            None => unchanged.push(index),
        }
    }

    ensure_additive(&snapshot.config, &config)?;

    let all_deferred = !update.changes.is_empty() && deferred.len() == update.changes.len();
    let merged = if all_deferred {
        tracing::debug!(version = %pinned, "every change deferred, snapshot kept");
        snapshot.clone()
    } else {
        ConfigSnapshot::new(update.to, config)
    };

    tracing::info!(
        from = %pinned,
        to = %merged.version,
        applied = applied.len(),
        deferred = deferred.len(),
        "merged template update"
    );

    Ok(MergeOutcome {
        snapshot: merged,
        applied,
        unchanged,
        deferred,
        skipped,
        informational,
    })
}

/// Returns `true` if `latest` is strictly newer than `current`.
pub fn has_update_available(current: &Version, latest: &Version) -> bool {
    is_newer(current, latest)
}
