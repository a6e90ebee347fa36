//! Update merge engine for template evolution.
//!
//! A catalog process expresses a template change as a [`TemplateUpdate`]: an
//! ordered list of [`UpdateChange`]s between two versions. This crate decides
//! whether such an update is safe ([`validate`]) and folds it into a merchant's
//! [`ConfigSnapshot`] without deleting, renaming or reordering anything the
//! merchant already has ([`merge`]).
//!
//! # Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use tevo_merge::{merge, validate, ConfigSnapshot, TargetKind, TemplateUpdate, UpdateChange};
//! use tevo_types::Version;
//!
//! let snapshot = ConfigSnapshot::from_value(
//!     Version::new(1, 3),
//!     &json!({"workflows": {"intake": {"steps": ["new", "paid"]}}}),
//! )
//! .unwrap();
//! let update = TemplateUpdate::new(Version::new(1, 3), Version::new(1, 4))
//!     .with_change(UpdateChange::add(TargetKind::Workflow, "workflows.fulfillment", "Fulfillment"));
//!
//! let report = validate(&update);
//! report.ensure_applicable(false).unwrap();
//! let merged = merge(&snapshot, &update).unwrap();
//! assert!(merged.config.contains(&"workflows.fulfillment".parse().unwrap()));
//! ```

pub mod action;
pub mod change;
pub mod config;
pub mod diff;
pub mod error;
pub mod merge;
pub mod path;
pub mod summary;
pub mod tree;
pub mod validate;

pub use action::{ActionVerb, UpdateAction};
pub use change::{ChangeType, TargetKind, TemplateUpdate, UpdateChange};
pub use config::MergeConfig;
pub use diff::{diff_snapshots, ensure_additive, SnapshotChange, SnapshotDiff};
pub use error::{MergeError, MergeResult};
pub use merge::{has_update_available, merge, merge_detailed, MergeOutcome};
pub use path::ConfigPath;
pub use summary::{summarize, UpdateSummary, PRESERVED_GUARANTEES};
pub use tree::{ConfigNode, ConfigSnapshot, ConfigTree};
pub use validate::{validate, validate_with, IssueKind, UpdateIssue, ValidationReport};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::{json, Map, Value};
    use tevo_types::Version;

    fn from() -> Version {
        Version::new(1, 3)
    }

    fn to() -> Version {
        Version::new(1, 4)
    }

    fn snapshot(config: Value) -> ConfigSnapshot {
        ConfigSnapshot::from_value(from(), &config).unwrap()
    }

    // -----------------------------------------------------------------------
    // 1. Adding a workflow keeps the existing one intact
    // -----------------------------------------------------------------------
    #[test]
    fn add_workflow_beside_existing() {
        let intake = json!({"steps": ["new", "confirmed", "paid"], "notify": true});
        let base = snapshot(json!({"workflows": {"intake": intake.clone()}}));
        let update = TemplateUpdate::new(from(), to()).with_change(UpdateChange::add(
            TargetKind::Workflow,
            "workflows.fulfillment",
            "Fulfillment workflow",
        ));

        assert!(validate(&update).is_clean());
        let merged = merge(&base, &update).unwrap();

        let workflows = merged.config.to_value()["workflows"].clone();
        assert_eq!(workflows["intake"], intake);
        assert_eq!(workflows["fulfillment"], json!({}));
    }

    // -----------------------------------------------------------------------
    // 2. Merging the same additive update twice equals merging once
    // -----------------------------------------------------------------------
    #[test]
    fn additive_merge_is_idempotent() {
        let base = snapshot(json!({"fields": {"phone": {"type": "text"}}}));
        let update = TemplateUpdate::new(from(), to())
            .with_change(UpdateChange::add(TargetKind::Field, "fields.pickup_time", "Pickup time"))
            .with_change(UpdateChange::add(TargetKind::Field, "fields.phone", "Phone"));

        let once = merge(&base, &update).unwrap();
        let twice = merge(&once, &update).unwrap();
        assert_eq!(once, twice);
    }

    // -----------------------------------------------------------------------
    // 3. Only optional modifications: snapshot untouched
    // -----------------------------------------------------------------------
    #[test]
    fn optional_modifications_leave_snapshot_identical() {
        let base = snapshot(json!({"statuses": {"paid": {"color": "green"}}}));
        let update = TemplateUpdate::new(from(), to())
            .with_change(
                UpdateChange::modify(TargetKind::Status, "statuses.paid", "Teal paid")
                    .optional()
                    .with_value(json!({"color": "teal"})),
            )
            .with_change(UpdateChange::modify(TargetKind::Status, "statuses.new", "Grey new").optional());

        let outcome = merge_detailed(&base, &update).unwrap();
        assert_eq!(outcome.snapshot, base);
        assert_eq!(outcome.snapshot.version, from());
        assert!(outcome.snapshot.config.ptr_eq(&base.config));
        assert_eq!(outcome.deferred, vec![0, 1]);
    }

    // -----------------------------------------------------------------------
    // 4. Full pipeline: validate, gate on warnings, merge, summarize
    // -----------------------------------------------------------------------
    #[test]
    fn mixed_update_pipeline() {
        let base = snapshot(json!({
            "workflows": {"intake": {}},
            "reports": {"daily": {"enabled": true}}
        }));
        let update = TemplateUpdate::new(from(), to())
            .with_change(UpdateChange::add(TargetKind::Report, "reports.weekly", "Weekly totals"))
            .with_change(UpdateChange::deprecate(TargetKind::Report, "reports.daily", "Daily report"))
            .with_change(
                UpdateChange::modify(TargetKind::Workflow, "workflows.intake", "Reminder step")
                    .optional()
                    .with_value(json!({"reminder": true})),
            );

        let report = validate(&update);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 2); // modify without approval + deprecation
        assert!(report.ensure_applicable(false).is_err());
        report.ensure_applicable(true).unwrap();

        let outcome = merge_detailed(&base, &update).unwrap();
        assert_eq!(outcome.applied, vec![0]);
        assert_eq!(outcome.informational, vec![1]);
        assert_eq!(outcome.deferred, vec![2]);
        assert_eq!(
            outcome.snapshot.config.to_value()["reports"]["daily"],
            json!({"enabled": true})
        );

        let summary = summarize(&update);
        assert_eq!(summary.whats_new, vec!["Weekly totals"]);
        assert_eq!(summary.whats_optional, vec!["Reminder step"]);
    }

    // -----------------------------------------------------------------------
    // 5. Forbidden vocabulary blocks the update before merging
    // -----------------------------------------------------------------------
    #[test]
    fn forbidden_vocabulary_blocks_update() {
        let update = TemplateUpdate::new(from(), to()).requiring_approval().with_change(
            UpdateChange::modify(TargetKind::Status, "statuses", "Reorder statuses")
                .with_action(UpdateAction::new(ActionVerb::Reorder, TargetKind::Status)),
        );
        let report = validate(&update);
        assert!(!report.is_valid());
        assert!(matches!(report.ensure_applicable(true), Err(MergeError::Validation(_))));
    }

    // -----------------------------------------------------------------------
    // Property tests
    // -----------------------------------------------------------------------

    const ROOTS: [&str; 4] = ["workflows", "statuses", "fields", "reports"];
    const NAMES: [&str; 4] = ["a", "b", "c", "d"];

    fn arb_config() -> impl Strategy<Value = Value> {
        prop::collection::btree_map(
            prop::sample::select(ROOTS.to_vec()),
            prop::collection::btree_map(prop::sample::select(NAMES.to_vec()), "[a-z]{1,6}", 0..4),
            0..4,
        )
        .prop_map(|roots| {
            let mut config = Map::new();
            for (root, records) in roots {
                let records: Map<String, Value> = records
                    .into_iter()
                    .map(|(name, label)| (name.to_string(), json!({ "label": label })))
                    .collect();
                config.insert(root.to_string(), Value::Object(records));
            }
            Value::Object(config)
        })
    }

    fn arb_add() -> impl Strategy<Value = UpdateChange> {
        (
            prop::sample::select(ROOTS.to_vec()),
            prop::sample::select(NAMES.to_vec()),
            prop::option::of(prop::sample::select(vec!["steps", "options"])),
        )
            .prop_map(|(root, name, sub)| {
                let path = match sub {
                    Some(sub) => format!("{root}.{name}.{sub}"),
                    None => format!("{root}.{name}"),
                };
                UpdateChange::add(TargetKind::Workflow, path, "generated")
            })
    }

    fn arb_additive_update() -> impl Strategy<Value = TemplateUpdate> {
        prop::collection::vec(arb_add(), 0..8).prop_map(|changes| TemplateUpdate {
            from: from(),
            to: to(),
            changes,
            requires_approval: false,
        })
    }

    proptest! {
        #[test]
        fn additive_merge_never_removes_or_alters(config in arb_config(), update in arb_additive_update()) {
            let base = snapshot(config);
            let merged = merge(&base, &update).unwrap();

            let before: Vec<&str> = base.config.keys().collect();
            prop_assert!(before.iter().all(|k| merged.config.keys().any(|m| m == *k)));

            let diff = diff_snapshots(&base.config, &merged.config);
            prop_assert_eq!(diff.removals(), 0);
            prop_assert_eq!(diff.modifications(), 0);
        }

        #[test]
        fn additive_merge_idempotent(config in arb_config(), update in arb_additive_update()) {
            let once = merge(&snapshot(config), &update).unwrap();
            let twice = merge(&once, &update).unwrap();
            prop_assert_eq!(once, twice);
        }
    }
}
