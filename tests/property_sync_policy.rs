use chrono::{NaiveDate, Utc};
use proptest::prelude::*;
use stepsync::domain::models::{decide, derive, DayRecord, SyncDecision, SyncReport};
use uuid::Uuid;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
}

/// Fold a decision into the stored state the store would hold afterwards.
fn stored_after(decision: SyncDecision) -> DayRecord {
    match decision {
        SyncDecision::Create(record)
        | SyncDecision::RaiseSteps { updated: record, .. }
        | SyncDecision::RetainHigher { updated: record, .. }
        | SyncDecision::Stale(record)
        | SyncDecision::VersionMismatch(record) => record,
    }
}

proptest! {
    /// Property: with strictly increasing sequences the stored count is the
    /// running maximum, and the version counts exactly the raises.
    #[test]
    fn prop_monotonic_acceptance(
        reports in prop::collection::vec((0i64..=100_000, 1i64..5), 1..40),
        weight in prop::option::of(30.0f64..200.0),
    ) {
        let user_id = Uuid::new_v4();
        let mut stored: Option<DayRecord> = None;
        let mut sequence = 0i64;
        let mut max_steps = 0u32;
        let mut raises = 0u64;

        for (steps, gap) in reports {
            sequence += gap;
            let report = SyncReport::new(steps, sequence, "Sensor")
                .validate(day())
                .unwrap();

            let decision = decide(stored.as_ref(), user_id, &report, weight, Utc::now());
            match &decision {
                SyncDecision::Create(_) | SyncDecision::RaiseSteps { .. } => raises += 1,
                SyncDecision::RetainHigher { .. } => {}
                other => prop_assert!(false, "unexpected decision {other:?}"),
            }
            max_steps = max_steps.max(report.steps);

            let record = stored_after(decision);
            prop_assert_eq!(record.steps, max_steps);
            prop_assert_eq!(record.version, raises);
            prop_assert_eq!(record.sync_sequence, sequence);
            prop_assert!(record.metrics_consistent());
            stored = Some(record);
        }
    }

    /// Property: a sequence at or below the stored one is always stale.
    #[test]
    fn prop_stale_reports_are_rejected(
        stored_steps in 0u32..=100_000,
        stored_sequence in -1_000i64..1_000,
        lag in 0i64..1_000,
        steps in 0i64..=100_000,
        known_version in prop::option::of(0u64..5),
    ) {
        let existing = DayRecord::new(Uuid::new_v4(), day(), stored_steps, "Sensor", stored_sequence, None, Utc::now());
        let mut report = SyncReport::new(steps, stored_sequence - lag, "Watch");
        if let Some(v) = known_version {
            report = report.with_known_version(v);
        }
        let report = report.validate(day()).unwrap();

        let decision = decide(Some(&existing), existing.user_id, &report, None, Utc::now());
        prop_assert_eq!(decision, SyncDecision::Stale(existing));
    }

    /// Property: a newer sequence against an outdated version never applies.
    #[test]
    fn prop_outdated_version_conflicts(
        stored_version in 2u64..50,
        behind in 1u64..50,
        steps in 0i64..=100_000,
    ) {
        let mut existing = DayRecord::new(Uuid::new_v4(), day(), 1000, "Sensor", 1, None, Utc::now());
        existing.version = stored_version;
        let known = stored_version.saturating_sub(behind);

        let report = SyncReport::new(steps, 2, "Watch")
            .with_known_version(known)
            .validate(day())
            .unwrap();

        let decision = decide(Some(&existing), existing.user_id, &report, None, Utc::now());
        prop_assert_eq!(decision, SyncDecision::VersionMismatch(existing));
    }

    /// Property: derivation is bit-for-bit deterministic.
    #[test]
    fn prop_derivation_deterministic(
        steps in 0u32..=100_000,
        weight in prop::option::of(-10.0f64..300.0),
    ) {
        let first = derive(steps, weight);
        let second = derive(steps, weight);
        prop_assert_eq!(first.distance_km.to_bits(), second.distance_km.to_bits());
        prop_assert_eq!(first.kcal, second.kcal);
        prop_assert_eq!(first.active_minutes, second.active_minutes);
        prop_assert_eq!(first.active_minutes, steps / 100);
    }
}

#[test]
fn test_reference_derivation() {
    let metrics = derive(10_000, Some(70.0));
    assert!((metrics.distance_km - 7.0).abs() < f64::EPSILON);
    assert_eq!(metrics.active_minutes, 100);
    assert_eq!(metrics.kcal, 315);
}
