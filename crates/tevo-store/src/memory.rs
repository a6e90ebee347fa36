//! In-memory stores for testing and ephemeral use.
//!
//! Both stores keep their data in a `BTreeMap` behind a `RwLock`. Data is
//! lost when the store is dropped.

use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use tevo_deprecation::{DeprecationRecord, DeprecationResult};
use tevo_merge::ConfigSnapshot;
use tevo_types::{TemplateId, Version};

use crate::error::{Result, StoreError};
use crate::traits::{DeprecationStore, SnapshotStore};
use crate::types::MerchantId;

fn poisoned<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::LockPoisoned(e.to_string())
}

/// An in-memory implementation of [`SnapshotStore`].
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    snapshots: RwLock<BTreeMap<MerchantId, ConfigSnapshot>>,
}

impl InMemorySnapshotStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn get(&self, merchant: &MerchantId) -> Result<Option<ConfigSnapshot>> {
        let snapshots = self.snapshots.read().map_err(poisoned)?;
        Ok(snapshots.get(merchant).cloned())
    }

    fn create(&self, merchant: &MerchantId, snapshot: &ConfigSnapshot) -> Result<()> {
        let mut snapshots = self.snapshots.write().map_err(poisoned)?;
        if snapshots.contains_key(merchant) {
            return Err(StoreError::AlreadyExists {
                name: format!("snapshot/{merchant}"),
            });
        }
        snapshots.insert(merchant.clone(), snapshot.clone());
        tracing::info!(merchant = %merchant, version = %snapshot.version, "snapshot created");
        Ok(())
    }

    fn put_if_version(&self, merchant: &MerchantId, expected: Version, snapshot: &ConfigSnapshot) -> Result<()> {
        let mut snapshots = self.snapshots.write().map_err(poisoned)?;
        let current = snapshots.get_mut(merchant).ok_or_else(|| StoreError::NotFound {
            name: format!("snapshot/{merchant}"),
        })?;
        if current.version != expected {
            return Err(StoreError::StaleSnapshot {
                merchant: merchant.clone(),
                expected,
                actual: current.version,
            });
        }
        *current = snapshot.clone();
        tracing::debug!(merchant = %merchant, from = %expected, to = %snapshot.version, "snapshot replaced");
        Ok(())
    }

    fn merchants(&self) -> Result<Vec<MerchantId>> {
        let snapshots = self.snapshots.read().map_err(poisoned)?;
        Ok(snapshots.keys().cloned().collect())
    }
}

/// An in-memory implementation of [`DeprecationStore`].
#[derive(Debug, Default)]
pub struct InMemoryDeprecationStore {
    records: RwLock<BTreeMap<TemplateId, DeprecationRecord>>,
}

impl InMemoryDeprecationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn update(
        &self,
        template_id: &TemplateId,
        change: impl FnOnce(DeprecationRecord) -> DeprecationResult<DeprecationRecord>,
    ) -> Result<DeprecationRecord> {
        let mut records = self.records.write().map_err(poisoned)?;
        let current = records.get(template_id).cloned().ok_or_else(|| StoreError::NotFound {
            name: format!("deprecation/{template_id}"),
        })?;
        let updated = change(current)?;
        records.insert(template_id.clone(), updated.clone());
        Ok(updated)
    }
}

impl DeprecationStore for InMemoryDeprecationStore {
    fn record(&self, record: DeprecationRecord) -> Result<()> {
        let mut records = self.records.write().map_err(poisoned)?;
        let id = record.template_id().clone();
        if records.contains_key(&id) {
            return Err(StoreError::AlreadyExists {
                name: format!("deprecation/{id}"),
            });
        }
        tracing::info!(template = %id, reason = %record.reason(), "template deprecated");
        records.insert(id, record);
        Ok(())
    }

    fn get(&self, template_id: &TemplateId) -> Result<Option<DeprecationRecord>> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records.get(template_id).cloned())
    }

    fn attach_replacement(
        &self,
        template_id: &TemplateId,
        replacement_id: &TemplateId,
        replacement_name: &str,
    ) -> Result<DeprecationRecord> {
        let updated = self.update(template_id, |r| {
            r.with_replacement(replacement_id.clone(), replacement_name)
        })?;
        tracing::info!(template = %template_id, replacement = %replacement_id, "replacement attached");
        Ok(updated)
    }

    fn set_end_of_life(&self, template_id: &TemplateId, end_of_life: DateTime<Utc>) -> Result<DeprecationRecord> {
        let updated = self.update(template_id, |r| r.with_end_of_life(end_of_life))?;
        tracing::info!(template = %template_id, end_of_life = %end_of_life, "end of life set");
        Ok(updated)
    }

    fn list(&self) -> Result<Vec<DeprecationRecord>> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::json;
    use tevo_deprecation::{DeprecationError, DeprecationReason};

    fn snapshot(major: u32, minor: u32) -> ConfigSnapshot {
        ConfigSnapshot::from_value(Version::new(major, minor), &json!({"workflows": {"intake": {}}})).unwrap()
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn create_then_get() {
        let store = InMemorySnapshotStore::new();
        let merchant = MerchantId::from("m-1");
        assert!(store.get(&merchant).unwrap().is_none());

        store.create(&merchant, &snapshot(1, 3)).unwrap();
        assert_eq!(store.get(&merchant).unwrap(), Some(snapshot(1, 3)));
        assert_eq!(store.merchants().unwrap(), vec![merchant.clone()]);

        let err = store.create(&merchant, &snapshot(1, 4)).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));
    }

    #[test]
    fn require_missing_snapshot() {
        let store = InMemorySnapshotStore::new();
        let err = store.require(&MerchantId::from("ghost")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { name } if name == "snapshot/ghost"));
    }

    #[test]
    fn put_rejects_stale_version() {
        let store = InMemorySnapshotStore::new();
        let merchant = MerchantId::from("m-1");
        store.create(&merchant, &snapshot(1, 3)).unwrap();

        store.put_if_version(&merchant, Version::new(1, 3), &snapshot(1, 4)).unwrap();
        let err = store
            .put_if_version(&merchant, Version::new(1, 3), &snapshot(1, 5))
            .unwrap_err();
        match err {
            StoreError::StaleSnapshot { expected, actual, .. } => {
                assert_eq!(expected, Version::new(1, 3));
                assert_eq!(actual, Version::new(1, 4));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store.require(&merchant).unwrap().version, Version::new(1, 4));
    }

    #[test]
    fn put_requires_existing_snapshot() {
        let store = InMemorySnapshotStore::new();
        let err = store
            .put_if_version(&MerchantId::from("m-1"), Version::new(1, 0), &snapshot(1, 1))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn deprecation_records_are_append_only() {
        let store = InMemoryDeprecationStore::new();
        let record = DeprecationRecord::new("phone-gadget", "Phone & Gadget", DeprecationReason::LowActivation, at());
        store.record(record.clone()).unwrap();

        let again = DeprecationRecord::new("phone-gadget", "Phone & Gadget", DeprecationReason::SecurityConcern, at());
        assert!(matches!(store.record(again), Err(StoreError::AlreadyExists { .. })));

        let stored = store.get(&TemplateId::from("phone-gadget")).unwrap().unwrap();
        assert_eq!(stored, record);
    }

    #[test]
    fn evolve_record_keeps_reason_and_timestamp() {
        let store = InMemoryDeprecationStore::new();
        let id = TemplateId::from("simple-retail");
        store
            .record(DeprecationRecord::new(id.clone(), "Simple Retail", DeprecationReason::ReplacedBySuperior, at()))
            .unwrap();

        store
            .attach_replacement(&id, &TemplateId::from("structured-retail"), "Structured Retail")
            .unwrap();
        let updated = store.set_end_of_life(&id, at() + Duration::days(60)).unwrap();

        assert_eq!(updated.reason(), DeprecationReason::ReplacedBySuperior);
        assert_eq!(updated.deprecated_at(), at());
        assert!(updated.replacement().is_some());
        assert_eq!(store.get(&id).unwrap(), Some(updated));
    }

    #[test]
    fn invalid_evolution_leaves_record_untouched() {
        let store = InMemoryDeprecationStore::new();
        let id = TemplateId::from("simple-retail");
        let record = DeprecationRecord::new(id.clone(), "Simple Retail", DeprecationReason::LowActivation, at());
        store.record(record.clone()).unwrap();

        let err = store.attach_replacement(&id, &id, "Simple Retail").unwrap_err();
        assert!(matches!(err, StoreError::Deprecation(DeprecationError::SelfReplacement(_))));
        let err = store.set_end_of_life(&id, at() - Duration::days(1)).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Deprecation(DeprecationError::EndOfLifeBeforeDeprecation { .. })
        ));
        assert_eq!(store.get(&id).unwrap(), Some(record));

        let missing = store.set_end_of_life(&TemplateId::from("food-catering"), at());
        assert!(matches!(missing, Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn ledger_reflects_stored_records() {
        let store = InMemoryDeprecationStore::new();
        for (id, reason) in [
            ("simple-retail", DeprecationReason::ReplacedBySuperior),
            ("phone-gadget", DeprecationReason::LowActivation),
        ] {
            store.record(DeprecationRecord::new(id, id, reason, at())).unwrap();
        }
        let listed: Vec<_> = store.list().unwrap().iter().map(|r| r.template_id().to_string()).collect();
        assert_eq!(listed, vec!["phone-gadget", "simple-retail"]);

        let ledger = store.ledger().unwrap();
        assert!(!ledger.can_adopt(&TemplateId::from("phone-gadget")));
        assert!(ledger.can_adopt(&TemplateId::from("food-catering")));
    }
}
