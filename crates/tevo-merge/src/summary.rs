use serde::{Deserialize, Serialize};

use crate::change::{ChangeType, TemplateUpdate};

/// Guarantees every additive update keeps. Asserted rather than derived: the
/// merge never removes, renames or reorders existing configuration.
pub const PRESERVED_GUARANTEES: [&str; 4] = [
    "All your existing orders",
    "All your records and history",
    "Your staff permissions",
    "Your customizations",
];

/// Human-facing description of an update.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSummary {
    pub whats_new: Vec<String>,
    pub stays_the_same: Vec<String>,
    pub whats_optional: Vec<String>,
}

/// Summarize an update for display to an adopter.
pub fn summarize(update: &TemplateUpdate) -> UpdateSummary {
    UpdateSummary {
        whats_new: update
            .changes_of_type(ChangeType::Add)
            .map(|(_, c)| c.description.clone())
            .collect(),
        stays_the_same: PRESERVED_GUARANTEES.iter().map(|s| s.to_string()).collect(),
        whats_optional: update
            .changes
            .iter()
            .filter(|c| c.optional)
            .map(|c| c.description.clone())
            .collect(),
    }
}
