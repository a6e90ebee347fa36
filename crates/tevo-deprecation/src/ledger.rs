//! Lifecycle queries over deprecation records.
//!
//! The free functions answer questions over any slice of records, which is
//! what a caller holding a catalog-sized list needs. [`DeprecationLedger`]
//! answers the same questions from a map keyed by template id.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tevo_types::TemplateId;

use crate::record::{DeprecationRecord, Replacement};

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// The record for `template_id`, if it is deprecated.
pub fn lookup<'a>(template_id: &TemplateId, records: &'a [DeprecationRecord]) -> Option<&'a DeprecationRecord> {
    records.iter().find(|r| r.template_id() == template_id)
}

/// Returns `true` iff some record names `template_id`.
pub fn is_deprecated(template_id: &TemplateId, records: &[DeprecationRecord]) -> bool {
    lookup(template_id, records).is_some()
}

/// Whether a new merchant may adopt `template_id`. Deprecated templates are
/// closed to all new adopters.
pub fn can_adopt(template_id: &TemplateId, records: &[DeprecationRecord]) -> bool {
    !is_deprecated(template_id, records)
}

/// The replacement recorded for `template_id`, if any.
pub fn suggested_alternative(template_id: &TemplateId, records: &[DeprecationRecord]) -> Option<Replacement> {
    lookup(template_id, records).and_then(|r| r.replacement().cloned())
}

/// Returns `true` if the record carries an end-of-life date.
pub fn has_deadline(record: &DeprecationRecord) -> bool {
    record.end_of_life().is_some()
}

/// Whole days from `now` until end of life, rounded up and never negative.
///
/// `None` when the record has no end-of-life date: existing adopters continue
/// indefinitely.
pub fn days_until_end_of_life(record: &DeprecationRecord, now: DateTime<Utc>) -> Option<u64> {
    let end_of_life = record.end_of_life()?;
    let remaining_ms = (end_of_life - now).num_milliseconds();
    if remaining_ms <= 0 {
        return Some(0);
    }
    Some(((remaining_ms + MS_PER_DAY - 1) / MS_PER_DAY) as u64)
}

/// Deprecation records keyed by template id.
#[derive(Clone, Debug, Default)]
pub struct DeprecationLedger {
    records: BTreeMap<TemplateId, DeprecationRecord>,
}

impl DeprecationLedger {
    /// An empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from records. A later record for the same template
    /// supersedes an earlier one.
    pub fn from_records(records: impl IntoIterator<Item = DeprecationRecord>) -> Self {
        let mut ledger = Self::new();
        for record in records {
            let id = record.template_id().clone();
            if ledger.records.insert(id.clone(), record).is_some() {
                tracing::warn!(template = %id, "duplicate deprecation record, keeping the later one");
            }
        }
        ledger
    }

    /// Record for `template_id`, if deprecated.
    pub fn lookup(&self, template_id: &TemplateId) -> Option<&DeprecationRecord> {
        self.records.get(template_id)
    }

    /// Returns `true` if `template_id` has a record.
    pub fn is_deprecated(&self, template_id: &TemplateId) -> bool {
        self.records.contains_key(template_id)
    }

    /// New adopters may only pick templates without a record.
    pub fn can_adopt(&self, template_id: &TemplateId) -> bool {
        !self.is_deprecated(template_id)
    }

    /// Replacement recommended for `template_id`.
    pub fn suggested_alternative(&self, template_id: &TemplateId) -> Option<&Replacement> {
        self.lookup(template_id).and_then(DeprecationRecord::replacement)
    }

    /// Records in template id order.
    pub fn records(&self) -> impl Iterator<Item = &DeprecationRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
