use serde::{Deserialize, Serialize};

/// Configuration for update validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Reject changes whose resolved action is forbidden, or whose explicit
    /// action disagrees with the change type. When `false`, only the coarse
    /// change type is inspected.
    pub enforce_action_vocabulary: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            enforce_action_vocabulary: true,
        }
    }
}

impl MergeConfig {
    /// Inspect change types only, ignoring the action vocabulary.
    pub fn change_types_only() -> Self {
        Self {
            enforce_action_vocabulary: false,
        }
    }
}
