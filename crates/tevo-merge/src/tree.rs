//! Immutable configuration trees and merchant snapshots.
//!
//! A [`ConfigTree`] is a persistent map: every branch sits behind an `Arc`, and
//! the only way to "change" a tree is to build a new one that shares all
//! untouched branches with the old. There is no removal or rename operation,
//! so a tree derived from another always contains every path of its parent.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tevo_types::Version;

use crate::error::{MergeError, MergeResult};
use crate::path::ConfigPath;

/// A node in a configuration tree.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigNode {
    /// A record (workflow, status, field or report definition, or a group of
    /// them).
    Branch(ConfigTree),
    /// Any non-object JSON value.
    Leaf(Value),
}

impl ConfigNode {
    /// Objects become branches, everything else a leaf.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self::Branch(ConfigTree::from_map(map)),
            other => Self::Leaf(other.clone()),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Branch(tree) => tree.to_value(),
            Self::Leaf(value) => value.clone(),
        }
    }

    /// The subtree, if this node is a record.
    pub fn as_branch(&self) -> Option<&ConfigTree> {
        match self {
            Self::Branch(tree) => Some(tree),
            Self::Leaf(_) => None,
        }
    }
}

/// Persistent, copy-on-write configuration map.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct ConfigTree {
    entries: Arc<BTreeMap<String, ConfigNode>>,
}

/// Dotted location of the node a copy-on-write operation could not change.
type Conflict = String;

impl ConfigTree {
    /// An empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from a JSON object.
    pub fn from_map(map: &Map<String, Value>) -> Self {
        let entries = map
            .iter()
            .map(|(k, v)| (k.clone(), ConfigNode::from_value(v)))
            .collect();
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Build a tree from a JSON value, which must be an object.
    pub fn from_value(value: &Value) -> MergeResult<Self> {
        match value {
            Value::Object(map) => Ok(Self::from_map(map)),
            other => Err(MergeError::NotAnObject(json_kind(other))),
        }
    }

    pub fn to_value(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(k, v)| (k.clone(), v.to_value()))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top-level keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Direct children in key order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &ConfigNode)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Look up a node by path.
    pub fn get(&self, path: &ConfigPath) -> Option<&ConfigNode> {
        let (first, rest) = path.segments().split_first()?;
        let mut node = self.entries.get(first)?;
        for segment in rest {
            node = node.as_branch()?.entries.get(segment)?;
        }
        Some(node)
    }

    /// Returns `true` if a node exists at `path`.
    pub fn contains(&self, path: &ConfigPath) -> bool {
        self.get(path).is_some()
    }

    /// Returns `true` if both trees share the same root allocation.
    pub fn ptr_eq(&self, other: &ConfigTree) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }

    /// Return a tree where `path` exists, creating it as `node` if missing.
    ///
    /// Intermediate records are created empty. An existing node at `path` is
    /// left untouched, in which case `None` is returned and the caller keeps
    /// the original tree.
    pub(crate) fn with_created(&self, path: &ConfigPath, node: &ConfigNode) -> MergeResult<Option<ConfigTree>> {
        self.create_at(path.segments(), 0, node)
            .map_err(|at| conflict(path, at))
    }

    /// Return a tree where the node at `path` has `overlay` applied.
    ///
    /// Object overlays merge field by field into an existing record; anything
    /// else replaces an existing scalar. Missing paths are not created and yield
    /// `None`, as do overlays that change nothing.
    pub(crate) fn with_overlay(&self, path: &ConfigPath, overlay: &Value) -> MergeResult<Option<ConfigTree>> {
        self.overlay_at(path.segments(), 0, overlay)
            .map_err(|at| conflict(path, at))
    }

    fn replaced(&self, key: &str, node: ConfigNode) -> ConfigTree {
        let mut entries = BTreeMap::clone(&self.entries);
        entries.insert(key.to_string(), node);
        ConfigTree {
            entries: Arc::new(entries),
        }
    }

    fn create_at(&self, path: &[String], depth: usize, node: &ConfigNode) -> Result<Option<ConfigTree>, Conflict> {
        let Some(head) = path.get(depth) else {
            return Ok(None);
        };
        let last = depth + 1 == path.len();

        match self.entries.get(head) {
            None => {
                let child = if last {
                    node.clone()
                } else {
                    let built = ConfigTree::new().create_at(path, depth + 1, node)?;
                    ConfigNode::Branch(built.unwrap_or_default())
                };
                Ok(Some(self.replaced(head, child)))
            }
            Some(_) if last => Ok(None),
            Some(ConfigNode::Branch(sub)) => Ok(sub
                .create_at(path, depth + 1, node)?
                .map(|sub| self.replaced(head, ConfigNode::Branch(sub)))),
            Some(ConfigNode::Leaf(_)) => Err(path[..=depth].join(".")),
        }
    }

    fn overlay_at(&self, path: &[String], depth: usize, overlay: &Value) -> Result<Option<ConfigTree>, Conflict> {
        let Some(head) = path.get(depth) else {
            return self.overlay_fields(overlay, path);
        };
        let last = depth + 1 == path.len();

        match self.entries.get(head) {
            None => Ok(None),
            Some(ConfigNode::Branch(sub)) => Ok(sub
                .overlay_at(path, depth + 1, overlay)?
                .map(|sub| self.replaced(head, ConfigNode::Branch(sub)))),
            Some(ConfigNode::Leaf(existing)) if last && !overlay.is_object() => {
                if existing == overlay {
                    return Ok(None);
                }
                Ok(Some(self.replaced(head, ConfigNode::Leaf(overlay.clone()))))
            }
            Some(ConfigNode::Leaf(_)) => Err(path[..=depth].join(".")),
        }
    }

    /// Merge the fields of an object overlay into this record, located at `at`.
    fn overlay_fields(&self, overlay: &Value, at: &[String]) -> Result<Option<ConfigTree>, Conflict> {
        let Value::Object(fields) = overlay else {
            return Err(at.join("."));
        };

        let mut current: Option<ConfigTree> = None;
        for (key, value) in fields {
            let base = current.as_ref().unwrap_or(self);
            let next = match (base.entries.get(key), value) {
                (None, value) => Some(base.replaced(key, ConfigNode::from_value(value))),
                (Some(ConfigNode::Branch(sub)), Value::Object(_)) => sub
                    .overlay_fields(value, &child_location(at, key))?
                    .map(|sub| base.replaced(key, ConfigNode::Branch(sub))),
                (Some(ConfigNode::Branch(_)), _) | (Some(ConfigNode::Leaf(_)), Value::Object(_)) => {
                    return Err(child_location(at, key).join("."));
                }
                (Some(ConfigNode::Leaf(existing)), value) if existing == value => None,
                (Some(ConfigNode::Leaf(_)), value) => {
                    Some(base.replaced(key, ConfigNode::Leaf(value.clone())))
                }
            };
            if next.is_some() {
                current = next;
            }
        }
        Ok(current)
    }
}

fn child_location(at: &[String], key: &str) -> Vec<String> {
    let mut location = at.to_vec();
    location.push(key.to_string());
    location
}

fn conflict(path: &ConfigPath, at: Conflict) -> MergeError {
    MergeError::PathConflict {
        path: path.to_string(),
        at,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl TryFrom<Value> for ConfigTree {
    type Error = MergeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

impl From<ConfigTree> for Value {
    fn from(tree: ConfigTree) -> Self {
        tree.to_value()
    }
}

/// A merchant's concrete configuration, pinned to a template version.
///
/// Snapshots are values: the merge engine never mutates one, it returns a new
/// snapshot that shares unchanged branches with the input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub version: Version,
    pub config: ConfigTree,
}

impl ConfigSnapshot {
    /// Pin `config` to `version`.
    pub fn new(version: Version, config: ConfigTree) -> Self {
        Self { version, config }
    }

    /// Build a snapshot from a JSON object.
    pub fn from_value(version: Version, config: &Value) -> MergeResult<Self> {
        Ok(Self::new(version, ConfigTree::from_value(config)?))
    }
}
