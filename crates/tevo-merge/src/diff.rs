//! Path-level diff between two configuration trees.
//!
//! Both trees are flattened to `path -> entry`, where records are recorded as
//! entries of their own so that an empty record gaining children is not
//! mistaken for a removal. The diff detects added, removed and modified paths.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{MergeError, MergeResult};
use crate::tree::{ConfigNode, ConfigTree};

/// The result of comparing two configuration trees.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SnapshotDiff {
    pub changes: Vec<SnapshotChange>,
}

impl SnapshotDiff {
    /// First removed path, if any.
    pub fn first_removal(&self) -> Option<&str> {
        self.changes
            .iter()
            .find(|c| matches!(c, SnapshotChange::Removed { .. }))
            .map(SnapshotChange::path)
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Number of added paths.
    pub fn additions(&self) -> usize {
        self.count(|c| matches!(c, SnapshotChange::Added { .. }))
    }

    /// Number of removed paths.
    pub fn removals(&self) -> usize {
        self.count(|c| matches!(c, SnapshotChange::Removed { .. }))
    }

    /// Number of paths whose value changed.
    pub fn modifications(&self) -> usize {
        self.count(|c| matches!(c, SnapshotChange::Modified { .. }))
    }

    fn count(&self, pred: impl Fn(&SnapshotChange) -> bool) -> usize {
        self.changes.iter().filter(|c| pred(c)).count()
    }
}

/// A single path-level change. `None` values denote records.
#[derive(Clone, Debug, PartialEq)]
pub enum SnapshotChange {
    Added { path: String, value: Option<Value> },
    Removed { path: String, value: Option<Value> },
    Modified {
        path: String,
        old: Option<Value>,
        new: Option<Value>,
    },
}

impl SnapshotChange {
    /// Path the change applies to.
    pub fn path(&self) -> &str {
        match self {
            Self::Added { path, .. } | Self::Removed { path, .. } | Self::Modified { path, .. } => path,
        }
    }
}

/// Flatten a tree to `path -> Some(leaf) | None (record)`.
fn flatten(tree: &ConfigTree) -> BTreeMap<String, Option<Value>> {
    fn walk(tree: &ConfigTree, prefix: &str, out: &mut BTreeMap<String, Option<Value>>) {
        for (key, node) in tree.entries() {
            let path = if prefix.is_empty() {
                key.to_string()
            } else {
                format!("{prefix}.{key}")
            };
            match node {
                ConfigNode::Branch(sub) => {
                    out.insert(path.clone(), None);
                    walk(sub, &path, out);
                }
                ConfigNode::Leaf(value) => {
                    out.insert(path, Some(value.clone()));
                }
            }
        }
    }

    let mut out = BTreeMap::new();
    walk(tree, "", &mut out);
    out
}

/// Compute the diff between two configuration trees.
pub fn diff_snapshots(old: &ConfigTree, new: &ConfigTree) -> SnapshotDiff {
    if old.ptr_eq(new) {
        return SnapshotDiff::default();
    }

    let old = flatten(old);
    let new = flatten(new);
    let mut changes = Vec::new();

    for (path, old_val) in &old {
        match new.get(path) {
            Some(new_val) if new_val != old_val => changes.push(SnapshotChange::Modified {
                path: path.clone(),
                old: old_val.clone(),
                new: new_val.clone(),
            }),
            Some(_) => {}
            None => changes.push(SnapshotChange::Removed {
                path: path.clone(),
                value: old_val.clone(),
            }),
        }
    }

    for (path, new_val) in &new {
        if !old.contains_key(path) {
            changes.push(SnapshotChange::Added {
                path: path.clone(),
                value: new_val.clone(),
            });
        }
    }

    SnapshotDiff { changes }
}

/// Fail with [`MergeError::RemovedPath`] if `new` lacks any path `old` holds.
pub fn ensure_additive(old: &ConfigTree, new: &ConfigTree) -> MergeResult<()> {
    match diff_snapshots(old, new).first_removal() {
        Some(path) => Err(MergeError::RemovedPath { path: path.to_string() }),
        None => Ok(()),
    }
}
