//! Persistence boundary for template evolution.
//!
//! The merge engine and the deprecation ledger never touch storage. This
//! crate defines where their inputs and outputs live between calls:
//!
//! - [`SnapshotStore`] holds each merchant's [`ConfigSnapshot`](tevo_merge::ConfigSnapshot)
//!   and only accepts writes made on top of the version that was read.
//! - [`DeprecationStore`] holds deprecation records. Records are appended,
//!   may gain a replacement or end-of-life date, and are never deleted.
//! - [`apply_update`] runs validate, merge and compare-and-swap as one step.
//!
//! # Modules
//!
//! - [`error`]: Error types for store operations
//! - [`types`]: [`MerchantId`]
//! - [`traits`]: The storage traits
//! - [`memory`]: In-memory backends for tests and short-lived processes
//! - [`apply`]: [`apply_update`]

pub mod apply;
pub mod error;
pub mod memory;
pub mod traits;
pub mod types;

pub use apply::{apply_update, ApplyOptions};
pub use error::{Result, StoreError};
pub use memory::{InMemoryDeprecationStore, InMemorySnapshotStore};
pub use traits::{DeprecationStore, SnapshotStore};
pub use types::MerchantId;
