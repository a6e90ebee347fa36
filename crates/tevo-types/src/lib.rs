//! Foundation types for template evolution (tevo).
//!
//! This crate holds the Version Model and the descriptive release types shared
//! by every other tevo crate. It has no knowledge of configuration content.
//!
//! # Key Types
//!
//! - [`Version`]: `v<major>.<minor>` identifier with a total order
//! - [`VersionType`]: classification of a transition (`major`/`minor`/`patch`)
//! - [`TemplateId`]: catalog identifier of a template
//! - [`TemplateRelease`] / [`VersionChange`]: published release and its changelog
//! - [`ReleaseHistory`]: append-only, strictly increasing releases of one template
//!
//! # Quick Start
//!
//! ```rust
//! use tevo_types::{classify, Version, VersionType};
//!
//! let from = Version::parse("v1.3").unwrap();
//! let to = Version::parse("v2.0").unwrap();
//! assert_eq!(classify(&from, &to), VersionType::Major);
//! assert_eq!(from.next(VersionType::Minor).unwrap().to_string(), "v1.4");
//! ```

pub mod error;
pub mod history;
pub mod template;
pub mod version;

pub use error::TypeError;
pub use history::ReleaseHistory;
pub use template::{ChangeCategory, ChangeKind, TemplateId, TemplateRelease, VersionChange};
pub use version::{classify, compare, compare_versions, is_newer, next, Version, VersionType};
