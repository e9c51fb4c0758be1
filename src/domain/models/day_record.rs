//! Day record domain model.
//!
//! A day record is the accepted step count of one user on one calendar date,
//! together with the metrics derived from it and the bookkeeping needed to
//! reconcile reports from several devices.

use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::metrics::{derive, DerivedMetrics};

/// Label used for days that have no stored record.
pub const NO_DATA_SOURCE: &str = "None";

/// Current timestamp at storage precision (microseconds).
pub fn now_micros() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// The accepted step count of a user for a single day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    pub user_id: Uuid,
    pub date: NaiveDate,
    /// Accepted step count, within `0..=MAX_DAILY_STEPS`
    pub steps: u32,
    #[serde(flatten)]
    pub metrics: DerivedMetrics,
    /// Body weight the metrics were derived with
    pub weight_kg: Option<f64>,
    /// Device or integration that produced the accepted count
    pub data_source: String,
    /// Client logical clock of the last accepted report
    pub sync_sequence: i64,
    /// Server-side optimistic concurrency counter
    pub version: u64,
    pub synced_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DayRecord {
    /// First record for a (user, date) pair, at version 1.
    pub fn new(
        user_id: Uuid,
        date: NaiveDate,
        steps: u32,
        data_source: impl Into<String>,
        sync_sequence: i64,
        weight_kg: Option<f64>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            date,
            steps,
            metrics: derive(steps, weight_kg),
            weight_kg,
            data_source: data_source.into(),
            sync_sequence,
            version: 1,
            synced_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the step count, re-deriving metrics and bumping the version.
    #[must_use]
    pub fn with_steps(
        &self,
        steps: u32,
        data_source: impl Into<String>,
        sync_sequence: i64,
        weight_kg: Option<f64>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            steps,
            metrics: derive(steps, weight_kg),
            weight_kg,
            data_source: data_source.into(),
            sync_sequence,
            version: self.version + 1,
            synced_at: now,
            updated_at: now,
            ..self.clone()
        }
    }

    /// Acknowledge a newer report without touching the accepted count.
    ///
    /// Only the sync sequence and sync timestamp move; version and
    /// `updated_at` stay put so the change is invisible to the feed.
    #[must_use]
    pub fn with_acknowledged_sequence(&self, sync_sequence: i64, now: DateTime<Utc>) -> Self {
        Self {
            sync_sequence,
            synced_at: now,
            ..self.clone()
        }
    }

    /// Guard a conditional update is checked against.
    pub fn record_version(&self) -> RecordVersion {
        RecordVersion {
            version: self.version,
            sync_sequence: self.sync_sequence,
        }
    }

    /// True when the stored metrics equal a fresh derivation.
    pub fn metrics_consistent(&self) -> bool {
        derive(self.steps, self.weight_kg) == self.metrics
    }
}

/// The state a record was loaded at; conditional writes succeed only if the
/// stored row still matches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordVersion {
    pub version: u64,
    pub sync_sequence: i64,
}

/// One calendar day in a range response: either a stored record or a
/// zero-valued placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub steps: u32,
    #[serde(flatten)]
    pub metrics: DerivedMetrics,
    pub data_source: String,
    pub version: u64,
    pub sync_sequence: i64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl DaySummary {
    /// Placeholder for a day without a stored record.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            steps: 0,
            metrics: DerivedMetrics::ZERO,
            data_source: NO_DATA_SOURCE.to_string(),
            version: 0,
            sync_sequence: 0,
            updated_at: None,
        }
    }

    pub fn is_recorded(&self) -> bool {
        self.updated_at.is_some()
    }
}

impl From<&DayRecord> for DaySummary {
    fn from(record: &DayRecord) -> Self {
        Self {
            date: record.date,
            steps: record.steps,
            metrics: record.metrics,
            data_source: record.data_source.clone(),
            version: record.version,
            sync_sequence: record.sync_sequence,
            updated_at: Some(record.updated_at),
        }
    }
}
