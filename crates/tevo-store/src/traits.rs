//! Storage traits at the boundary of the evolution engine.
//!
//! The merge engine and the deprecation ledger are pure. Anything that keeps
//! merchant snapshots or deprecation records between calls implements one of
//! these traits; the in-memory backends in [`crate::memory`] are the
//! reference implementations.

use chrono::{DateTime, Utc};
use tevo_deprecation::{DeprecationLedger, DeprecationRecord};
use tevo_merge::ConfigSnapshot;
use tevo_types::{TemplateId, Version};

use crate::error::{Result, StoreError};
use crate::types::MerchantId;

/// Storage for each merchant's current configuration snapshot.
///
/// Writes are compare-and-swap on the pinned version, so two processes that
/// read the same snapshot cannot both commit a merge on top of it.
pub trait SnapshotStore: Send + Sync {
    /// Read the merchant's snapshot. Returns `Ok(None)` if none is stored.
    fn get(&self, merchant: &MerchantId) -> Result<Option<ConfigSnapshot>>;

    /// Store the first snapshot for a merchant, typically at template
    /// adoption. Fails with `AlreadyExists` if one is stored.
    fn create(&self, merchant: &MerchantId, snapshot: &ConfigSnapshot) -> Result<()>;

    /// Replace the merchant's snapshot if it is still pinned to `expected`.
    ///
    /// Fails with `StaleSnapshot` if another writer moved it.
    fn put_if_version(&self, merchant: &MerchantId, expected: Version, snapshot: &ConfigSnapshot) -> Result<()>;

    /// All merchants with a stored snapshot, sorted.
    fn merchants(&self) -> Result<Vec<MerchantId>>;

    /// Read the merchant's snapshot, failing with `NotFound` if absent.
    fn require(&self, merchant: &MerchantId) -> Result<ConfigSnapshot> {
        self.get(merchant)?.ok_or_else(|| StoreError::NotFound {
            name: format!("snapshot/{merchant}"),
        })
    }
}

/// Append-only storage for deprecation records.
///
/// There is no delete. A record's reason and deprecation timestamp never
/// change once written.
pub trait DeprecationStore: Send + Sync {
    /// Write a new record. Fails with `AlreadyExists` if the template is
    /// already deprecated.
    fn record(&self, record: DeprecationRecord) -> Result<()>;

    /// Read the record for a template, if deprecated.
    fn get(&self, template_id: &TemplateId) -> Result<Option<DeprecationRecord>>;

    /// Attach or update the recommended replacement.
    fn attach_replacement(
        &self,
        template_id: &TemplateId,
        replacement_id: &TemplateId,
        replacement_name: &str,
    ) -> Result<DeprecationRecord>;

    /// Attach or move the end-of-life date.
    fn set_end_of_life(&self, template_id: &TemplateId, end_of_life: DateTime<Utc>) -> Result<DeprecationRecord>;

    /// Every record, ordered by template id.
    fn list(&self) -> Result<Vec<DeprecationRecord>>;

    /// A keyed ledger over the current records.
    fn ledger(&self) -> Result<DeprecationLedger> {
        Ok(DeprecationLedger::from_records(self.list()?))
    }
}
