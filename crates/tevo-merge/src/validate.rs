//! Safety validation of template updates.
//!
//! Validation never fails as control flow: every finding is reported in a
//! [`ValidationReport`]. Errors make an update invalid; warnings (approval
//! needed, something being deprecated) must be resolved by the caller before
//! the update is applied to an adopter.

use std::fmt;

use serde::{Deserialize, Serialize};
use tevo_types::is_newer;

use crate::change::{ChangeType, TemplateUpdate, UpdateChange};
use crate::config::MergeConfig;
use crate::error::{MergeError, MergeResult};
use crate::path::ConfigPath;

/// What a validation finding is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Destination version is not newer than the source.
    NonForwardVersion,
    /// The path is empty or has empty segments.
    InvalidPath,
    /// The resolved action is in the forbidden vocabulary.
    ForbiddenAction,
    /// An explicit action does not match the change type.
    InconsistentAction,
    /// A modification in an update that does not require approval.
    NeedsApproval,
    /// Something is being deprecated and must be surfaced to the adopter.
    Deprecation,
}

/// One validation finding, optionally tied to a change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateIssue {
    pub kind: IssueKind,
    /// Index of the offending change, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub message: String,
}

impl UpdateIssue {
    fn for_change(kind: IssueKind, index: usize, change: &UpdateChange, message: String) -> Self {
        Self {
            kind,
            change: Some(index),
            path: Some(change.path.clone()),
            message,
        }
    }
}

impl fmt::Display for UpdateIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.change {
            Some(i) => write!(f, "change #{i}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Result of validating a [`TemplateUpdate`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<UpdateIssue>,
    pub warnings: Vec<UpdateIssue>,
}

impl ValidationReport {
    fn from_issues(errors: Vec<UpdateIssue>, warnings: Vec<UpdateIssue>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Returns `true` if no errors were found.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Returns `true` if there are neither errors nor warnings.
    pub fn is_clean(&self) -> bool {
        self.valid && self.warnings.is_empty()
    }

    /// Gate before merging: errors always block, warnings block unless the
    /// adopter has acknowledged them.
    pub fn ensure_applicable(&self, warnings_acknowledged: bool) -> MergeResult<()> {
        if let Some(first) = self.errors.first() {
            return Err(MergeError::Validation(format!(
                "{} error(s), first: {first}",
                self.errors.len()
            )));
        }
        if !warnings_acknowledged {
            if let Some(first) = self.warnings.first() {
                return Err(MergeError::Validation(format!(
                    "{} unresolved warning(s), first: {first}",
                    self.warnings.len()
                )));
            }
        }
        Ok(())
    }
}

/// Validate an update with the default configuration.
pub fn validate(update: &TemplateUpdate) -> ValidationReport {
    validate_with(update, &MergeConfig::default())
}

/// Validate an update.
pub fn validate_with(update: &TemplateUpdate, config: &MergeConfig) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if !is_newer(&update.from, &update.to) {
        errors.push(UpdateIssue {
            kind: IssueKind::NonForwardVersion,
            change: None,
            path: None,
            message: format!(
                "destination {} is not newer than source {}",
                update.to, update.from
            ),
        });
    }

    for (index, change) in update.changes.iter().enumerate() {
        if let Err(err) = ConfigPath::parse(&change.path) {
            errors.push(UpdateIssue::for_change(IssueKind::InvalidPath, index, change, err.to_string()));
        }

        if config.enforce_action_vocabulary {
            let action = change.resolved_action();
            if action.is_forbidden() {
                errors.push(UpdateIssue::for_change(
                    IssueKind::ForbiddenAction,
                    index,
                    change,
                    format!("action '{action}' is forbidden: updates may not {} existing elements", action.verb.as_str()),
                ));
            } else if !action.verb.matches(change.change_type) {
                errors.push(UpdateIssue::for_change(
                    IssueKind::InconsistentAction,
                    index,
                    change,
                    format!("action '{action}' does not match change type '{}'", change.change_type),
                ));
            }
        }

        match change.change_type {
            ChangeType::Add => {}
            ChangeType::Modify if update.requires_approval => {}
            ChangeType::Modify => warnings.push(UpdateIssue::for_change(
                IssueKind::NeedsApproval,
                index,
                change,
                format!("modification of {} '{}' needs approval", change.target, change.path),
            )),
            ChangeType::Deprecate => warnings.push(UpdateIssue::for_change(
                IssueKind::Deprecation,
                index,
                change,
                format!("deprecates {} '{}': {}", change.target, change.path, change.description),
            )),
        }
    }

    tracing::debug!(
        from = %update.from,
        to = %update.to,
        changes = update.changes.len(),
        errors = errors.len(),
        warnings = warnings.len(),
        "validated template update"
    );

    ValidationReport::from_issues(errors, warnings)
}
