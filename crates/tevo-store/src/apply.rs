//! Read, merge and compare-and-swap an update into a stored snapshot.

use tevo_merge::{merge_detailed, validate_with, MergeConfig, MergeOutcome, TemplateUpdate};

use crate::error::{Result, StoreError};
use crate::traits::SnapshotStore;
use crate::types::MerchantId;

/// How [`apply_update`] validates and retries.
#[derive(Clone, Debug)]
pub struct ApplyOptions {
    pub merge: MergeConfig,
    /// The adopter has seen and accepted the update's warnings.
    pub warnings_acknowledged: bool,
    /// Extra attempts after losing a compare-and-swap race.
    pub max_retries: u32,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            merge: MergeConfig::default(),
            warnings_acknowledged: false,
            max_retries: 3,
        }
    }
}

/// Validate `update`, merge it into the merchant's stored snapshot and write
/// the result back, retrying when another writer got there first.
///
/// A retry re-reads the snapshot. If the winner already applied the same
/// update, the merge window still admits the snapshot and the retry commits
/// an unchanged configuration.
pub fn apply_update<S: SnapshotStore + ?Sized>(
    store: &S,
    merchant: &MerchantId,
    update: &TemplateUpdate,
    options: &ApplyOptions,
) -> Result<MergeOutcome> {
    validate_with(update, &options.merge).ensure_applicable(options.warnings_acknowledged)?;

    let attempts = options.max_retries.saturating_add(1);
    for attempt in 1..=attempts {
        let current = store.require(merchant)?;
        let outcome = merge_detailed(&current, update)?;
        match store.put_if_version(merchant, current.version, &outcome.snapshot) {
            Ok(()) => {
                tracing::info!(
                    merchant = %merchant,
                    from = %current.version,
                    to = %outcome.snapshot.version,
                    applied = outcome.applied.len(),
                    attempt,
                    "update applied"
                );
                return Ok(outcome);
            }
            Err(StoreError::StaleSnapshot { actual, .. }) => {
                tracing::warn!(merchant = %merchant, expected = %current.version, actual = %actual, attempt, "snapshot moved, retrying");
            }
            Err(e) => return Err(e),
        }
    }

    Err(StoreError::RetriesExhausted {
        merchant: merchant.clone(),
        attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemorySnapshotStore;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tevo_merge::{ConfigSnapshot, MergeError, TargetKind, UpdateChange};
    use tevo_types::Version;

    fn merchant() -> MerchantId {
        MerchantId::from("m-42")
    }

    fn seeded(version: Version) -> InMemorySnapshotStore {
        let store = InMemorySnapshotStore::new();
        let snapshot = ConfigSnapshot::from_value(version, &json!({"fields": {"phone": {"type": "text"}}})).unwrap();
        store.create(&merchant(), &snapshot).unwrap();
        store
    }

    fn add_pickup() -> TemplateUpdate {
        TemplateUpdate::new(Version::new(1, 3), Version::new(1, 4))
            .with_change(UpdateChange::add(TargetKind::Field, "fields.pickup_time", "Pickup time"))
    }

    /// Moves the stored snapshot under the caller a fixed number of times.
    struct Racing {
        inner: InMemorySnapshotStore,
        races: AtomicU32,
    }

    impl SnapshotStore for Racing {
        fn get(&self, merchant: &MerchantId) -> Result<Option<ConfigSnapshot>> {
            self.inner.get(merchant)
        }

        fn create(&self, merchant: &MerchantId, snapshot: &ConfigSnapshot) -> Result<()> {
            self.inner.create(merchant, snapshot)
        }

        fn put_if_version(&self, merchant: &MerchantId, expected: Version, snapshot: &ConfigSnapshot) -> Result<()> {
            if self.races.load(Ordering::SeqCst) > 0 {
                self.races.fetch_sub(1, Ordering::SeqCst);
                let current = self.inner.require(merchant)?;
                let bumped = ConfigSnapshot::new(Version::new(1, current.version.minor + 1), current.config.clone());
                self.inner.put_if_version(merchant, current.version, &bumped)?;
            }
            self.inner.put_if_version(merchant, expected, snapshot)
        }

        fn merchants(&self) -> Result<Vec<MerchantId>> {
            self.inner.merchants()
        }
    }

    #[test]
    fn deferred_only_update_keeps_merchant_pinned() {
        let store = seeded(Version::new(1, 3));
        let update = TemplateUpdate::new(Version::new(1, 3), Version::new(1, 4)).with_change(
            UpdateChange::modify(TargetKind::Field, "fields.phone", "Require phone")
                .optional()
                .with_value(json!({"required": true})),
        );
        let options = ApplyOptions {
            warnings_acknowledged: true,
            ..ApplyOptions::default()
        };
        let before = store.require(&merchant()).unwrap();
        let outcome = apply_update(&store, &merchant(), &update, &options).unwrap();
        assert_eq!(outcome.deferred, vec![0]);
        assert_eq!(store.require(&merchant()).unwrap(), before);
    }

    #[test]
    fn applies_and_persists() {
        let store = seeded(Version::new(1, 3));
        let outcome = apply_update(&store, &merchant(), &add_pickup(), &ApplyOptions::default()).unwrap();
        assert_eq!(outcome.applied, vec![0]);

        let stored = store.require(&merchant()).unwrap();
        assert_eq!(stored.version, Version::new(1, 4));
        assert_eq!(stored.config.to_value()["fields"]["phone"], json!({"type": "text"}));
        assert_eq!(stored.config.to_value()["fields"]["pickup_time"], json!({}));
    }

    #[test]
    fn unacknowledged_warnings_block_before_reading() {
        let store = InMemorySnapshotStore::new();
        let update = TemplateUpdate::new(Version::new(1, 3), Version::new(1, 4))
            .with_change(UpdateChange::modify(TargetKind::Field, "fields.phone", "Phone format"));
        let err = apply_update(&store, &merchant(), &update, &ApplyOptions::default()).unwrap_err();
        assert!(matches!(err, StoreError::Merge(MergeError::Validation(_))));
    }

    #[test]
    fn retries_after_losing_a_race() {
        let store = Racing {
            inner: seeded(Version::new(1, 3)),
            races: AtomicU32::new(1),
        };
        // The racer bumps 1.3 to 1.4, which is still inside the window.
        let outcome = apply_update(&store, &merchant(), &add_pickup(), &ApplyOptions::default()).unwrap();
        assert_eq!(outcome.snapshot.version, Version::new(1, 4));
        assert!(store.inner.require(&merchant()).unwrap().config.to_value()["fields"]["pickup_time"].is_object());
    }

    #[test]
    fn gives_up_after_max_retries() {
        let store = Racing {
            inner: seeded(Version::new(1, 3)),
            races: AtomicU32::new(5),
        };
        let update = TemplateUpdate::new(Version::new(1, 3), Version::new(1, 20))
            .with_change(UpdateChange::add(TargetKind::Field, "fields.notes", "Notes"));
        let options = ApplyOptions {
            max_retries: 2,
            ..ApplyOptions::default()
        };
        let err = apply_update(&store, &merchant(), &update, &options).unwrap_err();
        assert!(matches!(err, StoreError::RetriesExhausted { attempts: 3, .. }));
    }

    #[test]
    fn out_of_window_snapshot_is_rejected() {
        let store = seeded(Version::new(1, 1));
        let err = apply_update(&store, &merchant(), &add_pickup(), &ApplyOptions::default()).unwrap_err();
        assert!(matches!(err, StoreError::Merge(MergeError::VersionOutOfRange { .. })));
    }

    #[test]
    fn concurrent_appliers_converge() {
        let store = Arc::new(seeded(Version::new(1, 3)));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    let options = ApplyOptions {
                        max_retries: 8,
                        ..ApplyOptions::default()
                    };
                    apply_update(store.as_ref(), &merchant(), &add_pickup(), &options).map(|o| o.snapshot)
                })
            })
            .collect();

        let results: Vec<ConfigSnapshot> = handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect();
        let stored = store.require(&merchant()).unwrap();
        assert!(results.iter().all(|s| *s == stored));
    }
}
