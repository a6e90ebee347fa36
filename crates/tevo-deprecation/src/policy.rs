//! Thresholds at which an operator should consider deprecating a template.
//!
//! These are published constants only. Measuring activation and usage, and
//! deciding to create a [`DeprecationRecord`](crate::DeprecationRecord), is
//! the job of an external policy process.

use serde::{Deserialize, Serialize};

use crate::record::DeprecationReason;

/// Minimum relative activation-rate improvement of a replacement (20%).
pub const SUPERIOR_ACTIVATION_IMPROVEMENT: f64 = 0.20;
/// Activation rate below which a template counts as low-activation (10%).
pub const LOW_ACTIVATION_RATE: f64 = 0.10;
/// Adoptions required before the low-activation rate is meaningful.
pub const LOW_ACTIVATION_MIN_SAMPLE: u32 = 50;
/// Relative usage decline that signals changed business patterns (40%).
pub const USAGE_DECLINE: f64 = 0.40;

/// A deprecation trigger and its threshold. Security concerns have no
/// threshold and are raised by operators directly.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "trigger", rename_all = "snake_case")]
pub enum DeprecationTrigger {
    SuperiorReplacement { min_activation_improvement: f64 },
    LowActivation { max_activation_rate: f64, min_sample_size: u32 },
    PatternsChanged { min_usage_decline: f64 },
}

impl DeprecationTrigger {
    /// The reason a record created by this trigger carries.
    pub fn reason(&self) -> DeprecationReason {
        match self {
            Self::SuperiorReplacement { .. } => DeprecationReason::ReplacedBySuperior,
            Self::LowActivation { .. } => DeprecationReason::LowActivation,
            Self::PatternsChanged { .. } => DeprecationReason::BusinessPatternsChanged,
        }
    }
}

/// Configurable thresholds, defaulting to the published constants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeprecationPolicy {
    pub superior_activation_improvement: f64,
    pub low_activation_rate: f64,
    pub low_activation_min_sample: u32,
    pub usage_decline: f64,
}

impl Default for DeprecationPolicy {
    fn default() -> Self {
        Self {
            superior_activation_improvement: SUPERIOR_ACTIVATION_IMPROVEMENT,
            low_activation_rate: LOW_ACTIVATION_RATE,
            low_activation_min_sample: LOW_ACTIVATION_MIN_SAMPLE,
            usage_decline: USAGE_DECLINE,
        }
    }
}

impl DeprecationPolicy {
    /// The triggers this policy defines.
    pub fn triggers(&self) -> [DeprecationTrigger; 3] {
        [
            DeprecationTrigger::SuperiorReplacement {
                min_activation_improvement: self.superior_activation_improvement,
            },
            DeprecationTrigger::LowActivation {
                max_activation_rate: self.low_activation_rate,
                min_sample_size: self.low_activation_min_sample,
            },
            DeprecationTrigger::PatternsChanged {
                min_usage_decline: self.usage_decline,
            },
        ]
    }

    /// The trigger that would lead to `reason`, if one exists.
    pub fn trigger_for(&self, reason: DeprecationReason) -> Option<DeprecationTrigger> {
        self.triggers().into_iter().find(|t| t.reason() == reason)
    }
}
