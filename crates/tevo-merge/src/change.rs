use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tevo_types::Version;

use crate::action::UpdateAction;

/// Coarse type of a machine-applicable change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Add,
    Modify,
    Deprecate,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "add",
            Self::Modify => "modify",
            Self::Deprecate => "deprecate",
        })
    }
}

/// The kind of configuration element a change targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Workflow,
    Status,
    Field,
    Report,
}

impl TargetKind {
    pub const ALL: [TargetKind; 4] = [Self::Workflow, Self::Status, Self::Field, Self::Report];

    /// Lowercase name, as serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Workflow => "workflow",
            Self::Status => "status",
            Self::Field => "field",
            Self::Report => "report",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One atomic change between two template versions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpdateChange {
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    pub target: TargetKind,
    /// Dotted path into the configuration tree, e.g. `workflows.fulfillment`.
    pub path: String,
    pub description: String,
    /// An adopter may decline this change without blocking the rest.
    #[serde(default)]
    pub optional: bool,
    /// Explicit action name; derived from `type` and `target` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<UpdateAction>,
    /// Definition to create (`add`) or fields to overlay (`modify`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl UpdateChange {
    fn new(change_type: ChangeType, target: TargetKind, path: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            change_type,
            target,
            path: path.into(),
            description: description.into(),
            optional: false,
            action: None,
            value: None,
        }
    }

    /// A change that creates `path` if it is missing.
    pub fn add(target: TargetKind, path: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(ChangeType::Add, target, path, description)
    }

    /// A change that overlays fields onto an existing `path`.
    pub fn modify(target: TargetKind, path: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(ChangeType::Modify, target, path, description)
    }

    /// A change that flags `path` as deprecated without touching it.
    pub fn deprecate(target: TargetKind, path: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(ChangeType::Deprecate, target, path, description)
    }

    /// Mark the change as declinable by the adopter.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Name the action explicitly instead of deriving it.
    pub fn with_action(mut self, action: UpdateAction) -> Self {
        self.action = Some(action);
        self
    }

    /// Attach the definition to create or the fields to overlay.
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    /// The action this change performs, explicit or derived.
    pub fn resolved_action(&self) -> UpdateAction {
        self.action
            .unwrap_or_else(|| UpdateAction::derived(self.change_type, self.target))
    }
}

/// The full transition between two versions of a template.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateUpdate {
    pub from: Version,
    pub to: Version,
    /// Applied in order.
    pub changes: Vec<UpdateChange>,
    /// At least one change is a modification a human must confirm.
    #[serde(default)]
    pub requires_approval: bool,
}

impl TemplateUpdate {
    /// An empty update from `from` to `to`.
    pub fn new(from: Version, to: Version) -> Self {
        Self {
            from,
            to,
            changes: Vec::new(),
            requires_approval: false,
        }
    }

    /// Append a change.
    pub fn with_change(mut self, change: UpdateChange) -> Self {
        self.changes.push(change);
        self
    }

    /// Mark the update as carrying modifications a human has approved.
    pub fn requiring_approval(mut self) -> Self {
        self.requires_approval = true;
        self
    }

    /// Changes of the given type, with their index in the update.
    pub fn changes_of_type(&self, change_type: ChangeType) -> impl Iterator<Item = (usize, &UpdateChange)> {
        self.changes
            .iter()
            .enumerate()
            .filter(move |(_, c)| c.change_type == change_type)
    }

    /// Returns `true` if every change is an `add`.
    pub fn is_additive(&self) -> bool {
        self.changes.iter().all(|c| c.change_type == ChangeType::Add)
    }
}
