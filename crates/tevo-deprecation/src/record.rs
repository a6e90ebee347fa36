use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tevo_types::TemplateId;

use crate::error::{DeprecationError, DeprecationResult};

/// Why a template was deprecated. Closed set: each reason has a fixed
/// adopter-facing sentence, see [`DeprecationReason::explanation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeprecationReason {
    ReplacedBySuperior,
    BusinessPatternsChanged,
    LowActivation,
    SecurityConcern,
}

impl DeprecationReason {
    pub const ALL: [DeprecationReason; 4] = [
        Self::ReplacedBySuperior,
        Self::BusinessPatternsChanged,
        Self::LowActivation,
        Self::SecurityConcern,
    ];

    /// Snake-case name, as serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReplacedBySuperior => "replaced_by_superior",
            Self::BusinessPatternsChanged => "business_patterns_changed",
            Self::LowActivation => "low_activation",
            Self::SecurityConcern => "security_concern",
        }
    }

    /// The sentence shown to adopters for this reason.
    pub fn explanation(&self) -> &'static str {
        match self {
            Self::ReplacedBySuperior => {
                "An improved version of this template is now available with better workflows and features."
            }
            Self::BusinessPatternsChanged => {
                "The way businesses like yours operate has changed, and this template no longer reflects it."
            }
            Self::LowActivation => {
                "Few merchants got value from this template, so it is no longer offered to new businesses."
            }
            Self::SecurityConcern => {
                "This template relies on configuration that no longer meets our security standards."
            }
        }
    }
}

impl fmt::Display for DeprecationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A template recommended in place of a deprecated one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub template_id: TemplateId,
    pub template_name: String,
}

/// Marks one template as no longer recommended.
///
/// Records are never deleted. `template_id`, `deprecated_at` and `reason` are
/// fixed at creation; a replacement and an end-of-life date can be attached
/// later through [`with_replacement`](Self::with_replacement) and
/// [`with_end_of_life`](Self::with_end_of_life), which return a new record.
///
/// Deserialization goes through the same checks, so a stored record that
/// replaces itself or ends before it was deprecated fails to load.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredRecord")]
pub struct DeprecationRecord {
    template_id: TemplateId,
    template_name: String,
    deprecated_at: DateTime<Utc>,
    reason: DeprecationReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    replacement: Option<Replacement>,
    #[serde(default)]
    migration_assistance: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end_of_life: Option<DateTime<Utc>>,
}

/// Wire form of [`DeprecationRecord`], checked on conversion.
#[derive(Deserialize)]
struct StoredRecord {
    template_id: TemplateId,
    template_name: String,
    deprecated_at: DateTime<Utc>,
    reason: DeprecationReason,
    #[serde(default)]
    replacement: Option<Replacement>,
    #[serde(default)]
    migration_assistance: bool,
    #[serde(default)]
    end_of_life: Option<DateTime<Utc>>,
}

impl TryFrom<StoredRecord> for DeprecationRecord {
    type Error = DeprecationError;

    fn try_from(stored: StoredRecord) -> Result<Self, Self::Error> {
        let mut record = Self::new(stored.template_id, stored.template_name, stored.reason, stored.deprecated_at)
            .with_migration_assistance(stored.migration_assistance);
        if let Some(replacement) = stored.replacement {
            record = record.with_replacement(replacement.template_id, replacement.template_name)?;
        }
        if let Some(end_of_life) = stored.end_of_life {
            record = record.with_end_of_life(end_of_life)?;
        }
        Ok(record)
    }
}

impl DeprecationRecord {
    /// A fresh record with no replacement and no end-of-life date.
    pub fn new(
        template_id: impl Into<TemplateId>,
        template_name: impl Into<String>,
        reason: DeprecationReason,
        deprecated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            template_id: template_id.into(),
            template_name: template_name.into(),
            deprecated_at,
            reason,
            replacement: None,
            migration_assistance: false,
            end_of_life: None,
        }
    }

    /// Deprecated template.
    pub fn template_id(&self) -> &TemplateId {
        &self.template_id
    }

    /// Display name at the time of deprecation.
    pub fn template_name(&self) -> &str {
        &self.template_name
    }

    /// When the template stopped being recommended.
    pub fn deprecated_at(&self) -> DateTime<Utc> {
        self.deprecated_at
    }

    /// Why the template was deprecated.
    pub fn reason(&self) -> DeprecationReason {
        self.reason
    }

    /// Recommended alternative, if any.
    pub fn replacement(&self) -> Option<&Replacement> {
        self.replacement.as_ref()
    }

    /// Whether a guided migration is offered.
    pub fn migration_assistance(&self) -> bool {
        self.migration_assistance
    }

    /// Date after which the template is no longer supported.
    pub fn end_of_life(&self) -> Option<DateTime<Utc>> {
        self.end_of_life
    }

    /// Attach or update the recommended replacement.
    pub fn with_replacement(
        mut self,
        template_id: impl Into<TemplateId>,
        template_name: impl Into<String>,
    ) -> DeprecationResult<Self> {
        let template_id = template_id.into();
        if template_id == self.template_id {
            return Err(DeprecationError::SelfReplacement(template_id));
        }
        self.replacement = Some(Replacement {
            template_id,
            template_name: template_name.into(),
        });
        Ok(self)
    }

    /// Record whether guided migration assistance exists.
    pub fn with_migration_assistance(mut self, available: bool) -> Self {
        self.migration_assistance = available;
        self
    }

    /// Attach or move the hard end-of-life date.
    pub fn with_end_of_life(mut self, end_of_life: DateTime<Utc>) -> DeprecationResult<Self> {
        if end_of_life < self.deprecated_at {
            return Err(DeprecationError::EndOfLifeBeforeDeprecation {
                deprecated_at: self.deprecated_at,
                end_of_life,
            });
        }
        self.end_of_life = Some(end_of_life);
        Ok(self)
    }
}
