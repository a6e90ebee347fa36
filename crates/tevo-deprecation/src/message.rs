use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tevo_types::TemplateId;

use crate::ledger::{days_until_end_of_life, lookup};
use crate::record::{DeprecationRecord, Replacement};

/// Title shown on every deprecation notice.
pub const DEPRECATION_TITLE: &str = "Template No Longer Recommended";

/// Display payload for a deprecated template.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeprecationMessage {
    pub title: String,
    pub message: String,
    pub has_replacement: bool,
    pub has_migration: bool,
}

/// Build the display payload for a record.
pub fn message(record: &DeprecationRecord) -> DeprecationMessage {
    DeprecationMessage {
        title: DEPRECATION_TITLE.to_string(),
        message: record.reason().explanation().to_string(),
        has_replacement: record.replacement().is_some(),
        has_migration: record.migration_assistance(),
    }
}

/// Everything an existing adopter's dashboard shows about a deprecated
/// template.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdopterNotice {
    pub template_id: TemplateId,
    pub template_name: String,
    pub message: DeprecationMessage,
    pub alternative: Option<Replacement>,
    pub end_of_life: Option<DateTime<Utc>>,
    pub days_remaining: Option<u64>,
}

/// The notice for an existing adopter of `template_id`, or `None` if the
/// template is not deprecated.
pub fn adopter_notice(
    template_id: &TemplateId,
    records: &[DeprecationRecord],
    now: DateTime<Utc>,
) -> Option<AdopterNotice> {
    let record = lookup(template_id, records)?;
    Some(AdopterNotice {
        template_id: record.template_id().clone(),
        template_name: record.template_name().to_string(),
        message: message(record),
        alternative: record.replacement().cloned(),
        end_of_life: record.end_of_life(),
        days_remaining: days_until_end_of_life(record, now),
    })
}
