//! Deprecation ledger for template evolution.
//!
//! A deprecated template is closed to new adopters while existing adopters
//! keep running it, optionally until an end-of-life date. Each
//! [`DeprecationRecord`] carries a reason from a closed set, a suggested
//! replacement and a migration flag, from which the adopter-facing
//! [`DeprecationMessage`] and [`AdopterNotice`] are built.
//!
//! # Quick Start
//!
//! ```rust
//! use chrono::Utc;
//! use tevo_deprecation::{can_adopt, message, DeprecationReason, DeprecationRecord};
//! use tevo_types::TemplateId;
//!
//! let record = DeprecationRecord::new(
//!     "simple-retail",
//!     "Simple Retail Selling",
//!     DeprecationReason::ReplacedBySuperior,
//!     Utc::now(),
//! )
//! .with_replacement("structured-retail", "Structured Retail")
//! .unwrap();
//!
//! let records = vec![record];
//! assert!(!can_adopt(&TemplateId::from("simple-retail"), &records));
//! assert!(message(&records[0]).has_replacement);
//! ```

pub mod error;
pub mod ledger;
pub mod message;
pub mod policy;
pub mod record;

pub use error::{DeprecationError, DeprecationResult};
pub use ledger::{
    can_adopt, days_until_end_of_life, has_deadline, is_deprecated, lookup, suggested_alternative,
    DeprecationLedger,
};
pub use message::{adopter_notice, message, AdopterNotice, DeprecationMessage, DEPRECATION_TITLE};
pub use policy::{
    DeprecationPolicy, DeprecationTrigger, LOW_ACTIVATION_MIN_SAMPLE, LOW_ACTIVATION_RATE,
    SUPERIOR_ACTIVATION_IMPROVEMENT, USAGE_DECLINE,
};
pub use record::{DeprecationReason, DeprecationRecord, Replacement};
