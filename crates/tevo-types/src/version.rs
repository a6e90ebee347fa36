//! Two-component template versions and transition classification.
//!
//! A [`Version`] is written `v<major>.<minor>`. Versions are totally ordered
//! by `major`, then `minor`. There is no patch component: a [`VersionType::Patch`]
//! transition is a metadata-only release that keeps the same identifier.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A published template version, `v<major>.<minor>`.
///
/// Ordering: `major` → `minor` (derived, total order).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    /// Incremented for releases that restructure the template.
    pub major: u32,
    /// Incremented for additive releases.
    pub minor: u32,
}

impl Version {
    /// Create a version from its components.
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parse a `v<major>.<minor>` string.
    ///
    /// Both components must be plain ASCII digits. Signs, whitespace, missing
    /// components, extra components and values that overflow `u32` are all
    /// rejected.
    pub fn parse(input: &str) -> Result<Self, TypeError> {
        let malformed = || TypeError::MalformedVersion(input.to_string());

        let body = input.strip_prefix('v').ok_or_else(malformed)?;
        let (major, minor) = body.split_once('.').ok_or_else(malformed)?;

        Ok(Self {
            major: parse_component(major).ok_or_else(malformed)?,
            minor: parse_component(minor).ok_or_else(malformed)?,
        })
    }

    /// Returns `true` if `candidate` is strictly newer than `self`.
    pub fn is_newer(&self, candidate: &Version) -> bool {
        compare(candidate, self) == Ordering::Greater
    }

    /// Classify the transition from `self` to `to`.
    pub fn classify(&self, to: &Version) -> VersionType {
        classify(self, to)
    }

    /// The version that follows `self` for a release of the given type.
    pub fn next(&self, version_type: VersionType) -> Result<Version, TypeError> {
        next(self, version_type)
    }
}

fn parse_component(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl FromStr for Version {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Version {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Version> for String {
    fn from(value: Version) -> Self {
        value.to_string()
    }
}

impl fmt::Debug for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Version(v{}.{})", self.major, self.minor)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}", self.major, self.minor)
    }
}

/// Classification of a transition between two versions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionType {
    /// The major component increased.
    Major,
    /// The minor component increased, major unchanged.
    Minor,
    /// Neither component increased. Versions carry no patch slot, so a patch
    /// release reuses the current identifier.
    Patch,
}

impl VersionType {
    /// Lowercase name, as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Patch => "patch",
        }
    }
}

impl fmt::Display for VersionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VersionType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "major" => Ok(Self::Major),
            "minor" => Ok(Self::Minor),
            "patch" => Ok(Self::Patch),
            other => Err(TypeError::UnknownVersionType(other.to_string())),
        }
    }
}

/// Total order over versions: `major` first, then `minor`.
pub fn compare(a: &Version, b: &Version) -> Ordering {
    a.major.cmp(&b.major).then(a.minor.cmp(&b.minor))
}

/// Parse and compare two version strings.
///
/// `Ordering` maps onto the `-1 / 0 / 1` convention via `as i8`.
pub fn compare_versions(a: &str, b: &str) -> Result<Ordering, TypeError> {
    Ok(compare(&Version::parse(a)?, &Version::parse(b)?))
}

/// Returns `true` iff `candidate` is strictly newer than `current`.
pub fn is_newer(current: &Version, candidate: &Version) -> bool {
    compare(candidate, current) == Ordering::Greater
}

/// Classify the transition `from` → `to`.
///
/// Only increases count: a lower major with a higher minor is `Minor`, and any
/// downgrade is `Patch`.
pub fn classify(from: &Version, to: &Version) -> VersionType {
    if to.major > from.major {
        VersionType::Major
    } else if to.minor > from.minor {
        VersionType::Minor
    } else {
        VersionType::Patch
    }
}

/// Compute the next version for a release of the given type.
///
/// `Patch` returns `current` unchanged; see [`VersionType::Patch`]. A
/// component already at `u32::MAX` has no successor and yields
/// [`TypeError::VersionOverflow`].
pub fn next(current: &Version, version_type: VersionType) -> Result<Version, TypeError> {
    let overflow = || TypeError::VersionOverflow {
        version: *current,
        version_type,
    };
    match version_type {
        VersionType::Major => Ok(Version::new(current.major.checked_add(1).ok_or_else(overflow)?, 0)),
        VersionType::Minor => Ok(Version::new(
            current.major,
            current.minor.checked_add(1).ok_or_else(overflow)?,
        )),
        VersionType::Patch => Ok(*current),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn parse_valid_versions() {
        assert_eq!(v("v1.3"), Version::new(1, 3));
        assert_eq!(v("v0.0"), Version::new(0, 0));
        assert_eq!(v("v12.40"), Version::new(12, 40));
    }

    #[test]
    fn parse_rejects_malformed() {
        for bad in [
            "", "v", "1.3", "v1", "v1.", "v.3", "v1.3.0", "V1.3", "v-1.3", "v+1.3", "v1. 3",
            " v1.3", "v1.3 ", "va.b", "v99999999999.0",
        ] {
            assert!(
                matches!(Version::parse(bad), Err(TypeError::MalformedVersion(_))),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn display_round_trips_through_parse() {
        let version = Version::new(4, 11);
        assert_eq!(version.to_string(), "v4.11");
        assert_eq!(v(&version.to_string()), version);
    }

    #[test]
    fn serde_uses_string_form() {
        let json = serde_json::to_string(&Version::new(2, 0)).unwrap();
        assert_eq!(json, "\"v2.0\"");
        let bad: Result<Version, _> = serde_json::from_str("\"2.0\"");
        assert!(bad.is_err());
    }

    #[test]
    fn compare_orders_major_before_minor() {
        assert_eq!(compare(&v("v1.9"), &v("v2.0")), Ordering::Less);
        assert_eq!(compare(&v("v2.0"), &v("v1.9")), Ordering::Greater);
        assert_eq!(compare(&v("v1.10"), &v("v1.9")), Ordering::Greater);
        assert_eq!(compare(&v("v3.1"), &v("v3.1")), Ordering::Equal);
    }

    #[test]
    fn compare_versions_maps_to_sign() {
        assert_eq!(compare_versions("v1.3", "v2.0").unwrap() as i8, -1);
        assert_eq!(compare_versions("v1.3", "v1.3").unwrap() as i8, 0);
        assert_eq!(compare_versions("v1.4", "v1.3").unwrap() as i8, 1);
        assert!(compare_versions("v1.3", "1.4").is_err());
    }

    #[test]
    fn is_newer_is_strict() {
        assert!(is_newer(&v("v1.3"), &v("v1.4")));
        assert!(!is_newer(&v("v1.3"), &v("v1.3")));
        assert!(!is_newer(&v("v1.3"), &v("v1.2")));
        assert!(v("v1.0").is_newer(&v("v2.0")));
    }

    #[test]
    fn classify_concrete_transitions() {
        assert_eq!(classify(&v("v1.3"), &v("v2.0")), VersionType::Major);
        assert_eq!(classify(&v("v1.3"), &v("v1.4")), VersionType::Minor);
        assert_eq!(classify(&v("v1.3"), &v("v1.3")), VersionType::Patch);
        assert_eq!(classify(&v("v2.0"), &v("v1.5")), VersionType::Minor);
        assert_eq!(classify(&v("v2.5"), &v("v1.0")), VersionType::Patch);
    }

    #[test]
    fn next_version_by_type() {
        assert_eq!(next(&v("v1.3"), VersionType::Major).unwrap(), v("v2.0"));
        assert_eq!(next(&v("v1.3"), VersionType::Minor).unwrap(), v("v1.4"));
        assert_eq!(next(&v("v1.3"), VersionType::Patch).unwrap(), v("v1.3"));
    }

    #[test]
    fn next_refuses_to_wrap_or_stall() {
        let top_major = Version::new(u32::MAX, 5);
        assert_eq!(
            next(&top_major, VersionType::Major).unwrap_err(),
            TypeError::VersionOverflow {
                version: top_major,
                version_type: VersionType::Major,
            }
        );
        assert_eq!(next(&top_major, VersionType::Minor).unwrap(), Version::new(u32::MAX, 6));

        let top_minor = Version::new(2, u32::MAX);
        assert!(matches!(
            top_minor.next(VersionType::Minor),
            Err(TypeError::VersionOverflow { version_type: VersionType::Minor, .. })
        ));
        assert_eq!(top_minor.next(VersionType::Major).unwrap(), Version::new(3, 0));
        assert_eq!(top_minor.next(VersionType::Patch).unwrap(), top_minor);
    }

    #[test]
    fn version_type_parses_lowercase_names() {
        assert_eq!("major".parse::<VersionType>().unwrap(), VersionType::Major);
        assert_eq!("patch".parse::<VersionType>().unwrap(), VersionType::Patch);
        assert!(matches!(
            "Major".parse::<VersionType>(),
            Err(TypeError::UnknownVersionType(_))
        ));
        assert_eq!(VersionType::Minor.to_string(), "minor");
    }

    fn arb_version() -> impl Strategy<Value = Version> {
        (0u32..50, 0u32..50).prop_map(|(major, minor)| Version::new(major, minor))
    }

    proptest! {
        #[test]
        fn compare_is_reflexive(a in arb_version()) {
            prop_assert_eq!(compare(&a, &a), Ordering::Equal);
        }

        #[test]
        fn compare_is_antisymmetric(a in arb_version(), b in arb_version()) {
            prop_assert_eq!(compare(&a, &b), compare(&b, &a).reverse());
        }

        #[test]
        fn compare_is_transitive(a in arb_version(), b in arb_version(), c in arb_version()) {
            if compare(&a, &b) != Ordering::Greater && compare(&b, &c) != Ordering::Greater {
                prop_assert_ne!(compare(&a, &c), Ordering::Greater);
            }
        }

        #[test]
        fn compare_agrees_with_ord(a in arb_version(), b in arb_version()) {
            prop_assert_eq!(compare(&a, &b), a.cmp(&b));
        }

        #[test]
        fn classify_self_is_patch(a in arb_version()) {
            prop_assert_eq!(classify(&a, &a), VersionType::Patch);
        }

        #[test]
        fn next_major_and_minor(a in arb_version()) {
            prop_assert_eq!(next(&a, VersionType::Major).unwrap(), Version::new(a.major + 1, 0));
            prop_assert_eq!(next(&a, VersionType::Minor).unwrap(), Version::new(a.major, a.minor + 1));
            prop_assert!(is_newer(&a, &next(&a, VersionType::Minor).unwrap()));
        }

        #[test]
        fn parse_accepts_rendered(a in arb_version()) {
            prop_assert_eq!(Version::parse(&a.to_string()).unwrap(), a);
        }
    }
}
