//! Closed vocabulary of update actions.
//!
//! Every [`UpdateChange`](crate::UpdateChange) resolves to exactly one
//! [`UpdateAction`], a verb applied to a target kind (`add_workflow`,
//! `rename_status`, ...). Verbs are split into an allowed set, which only
//! introduces or adjusts capability, and a forbidden set, which would remove,
//! rename, reorder or retype something an adopter already relies on.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::change::{ChangeType, TargetKind};
use crate::error::MergeError;

/// The verb half of an action name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionVerb {
    Add,
    /// Add a sub-element (step, option, column) to an existing element.
    Extend,
    Modify,
    Deprecate,
    Remove,
    Rename,
    Reorder,
    /// Change the type of an existing element (e.g. text field to number).
    Retype,
}

impl ActionVerb {
    pub const ALL: [ActionVerb; 8] = [
        Self::Add,
        Self::Extend,
        Self::Modify,
        Self::Deprecate,
        Self::Remove,
        Self::Rename,
        Self::Reorder,
        Self::Retype,
    ];

    /// Lowercase verb, as it appears in action names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Extend => "extend",
            Self::Modify => "modify",
            Self::Deprecate => "deprecate",
            Self::Remove => "remove",
            Self::Rename => "rename",
            Self::Reorder => "reorder",
            Self::Retype => "retype",
        }
    }

    /// Verbs no template update may ever carry.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Remove | Self::Rename | Self::Reorder | Self::Retype)
    }

    /// Whether a change of `change_type` may carry this verb.
    pub fn matches(&self, change_type: ChangeType) -> bool {
        matches!(
            (self, change_type),
            (Self::Add | Self::Extend, ChangeType::Add)
                | (Self::Modify, ChangeType::Modify)
                | (Self::Deprecate, ChangeType::Deprecate)
        )
    }
}

impl From<ChangeType> for ActionVerb {
    fn from(value: ChangeType) -> Self {
        match value {
            ChangeType::Add => Self::Add,
            ChangeType::Modify => Self::Modify,
            ChangeType::Deprecate => Self::Deprecate,
        }
    }
}

/// A named action: verb plus target kind, rendered `verb_target`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UpdateAction {
    pub verb: ActionVerb,
    pub target: TargetKind,
}

impl UpdateAction {
    /// Combine a verb and a target.
    pub const fn new(verb: ActionVerb, target: TargetKind) -> Self {
        Self { verb, target }
    }

    /// The action implied by a change that does not name one.
    pub fn derived(change_type: ChangeType, target: TargetKind) -> Self {
        Self::new(change_type.into(), target)
    }

    /// Returns `true` if the verb is never allowed in an update.
    pub fn is_forbidden(&self) -> bool {
        self.verb.is_forbidden()
    }

    /// Returns `true` unless the action is forbidden.
    pub fn is_allowed(&self) -> bool {
        !self.is_forbidden()
    }

    /// Every action in the vocabulary.
    pub fn all() -> impl Iterator<Item = UpdateAction> {
        ActionVerb::ALL.into_iter().flat_map(|verb| {
            TargetKind::ALL
                .into_iter()
                .map(move |target| UpdateAction::new(verb, target))
        })
    }

    /// Actions an update may carry.
    pub fn allowed() -> impl Iterator<Item = UpdateAction> {
        Self::all().filter(UpdateAction::is_allowed)
    }

    /// Actions no update may carry.
    pub fn forbidden() -> impl Iterator<Item = UpdateAction> {
        Self::all().filter(UpdateAction::is_forbidden)
    }
}

impl fmt::Debug for UpdateAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UpdateAction({self})")
    }
}

impl fmt::Display for UpdateAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.verb.as_str(), self.target.as_str())
    }
}

impl FromStr for UpdateAction {
    type Err = MergeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .find(|action| action.to_string() == s)
            .ok_or_else(|| MergeError::Validation(format!("unknown action '{s}'")))
    }
}

impl TryFrom<String> for UpdateAction {
    type Error = MergeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<UpdateAction> for String {
    fn from(value: UpdateAction) -> Self {
        value.to_string()
    }
}
