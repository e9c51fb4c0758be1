//! Sync reports and the decision policy applied to them.
//!
//! The policy is split into [`classify`], which only compares the incoming
//! report with the stored record, and [`apply`], which builds the new record
//! state. Neither performs I/O; the caller looks up body weight in between
//! when [`SyncVerdict::requires_derivation`] says it is needed.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::day_record::DayRecord;
use crate::domain::errors::{DomainError, DomainResult};

/// Upper bound of the steps domain.
pub const MAX_DAILY_STEPS: u32 = 100_000;

/// Source label used when a client omits one.
pub const UNKNOWN_DATA_SOURCE: &str = "Unknown";

/// A step-count report submitted by one device for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Calendar date, today (UTC) when absent
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub steps: i64,
    pub sync_sequence: i64,
    #[serde(default)]
    pub data_source: String,
    /// Version of the copy the client last fetched, if any
    #[serde(default)]
    pub known_version: Option<u64>,
}

impl SyncReport {
    pub fn new(steps: i64, sync_sequence: i64, data_source: impl Into<String>) -> Self {
        Self {
            date: None,
            steps,
            sync_sequence,
            data_source: data_source.into(),
            known_version: None,
        }
    }

    #[must_use]
    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    #[must_use]
    pub fn with_known_version(mut self, version: u64) -> Self {
        self.known_version = Some(version);
        self
    }

    /// Date this report applies to, given today's date.
    pub fn effective_date(&self, today: NaiveDate) -> NaiveDate {
        self.date.unwrap_or(today)
    }

    /// Check the steps domain and resolve defaults.
    pub fn validate(&self, today: NaiveDate) -> DomainResult<ValidatedReport> {
        let steps = u32::try_from(self.steps)
            .ok()
            .filter(|s| *s <= MAX_DAILY_STEPS)
            .ok_or_else(|| {
                DomainError::InvalidParameter(format!(
                    "steps must be between 0 and {MAX_DAILY_STEPS}, got {}",
                    self.steps
                ))
            })?;

        let data_source = match self.data_source.trim() {
            "" => UNKNOWN_DATA_SOURCE.to_string(),
            s => s.to_string(),
        };

        Ok(ValidatedReport {
            date: self.effective_date(today),
            steps,
            sync_sequence: self.sync_sequence,
            data_source,
            known_version: self.known_version,
        })
    }
}

/// A report whose fields passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedReport {
    pub date: NaiveDate,
    pub steps: u32,
    pub sync_sequence: i64,
    pub data_source: String,
    pub known_version: Option<u64>,
}

/// How a report relates to the stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncVerdict {
    /// No record yet for this day
    Create,
    /// Newer sequence with a higher count
    RaiseSteps,
    /// Newer sequence, but the stored count is already at least as high
    RetainHigher,
    /// Sequence not newer than the stored one
    Stale,
    /// Client edited an older version than the stored one
    VersionMismatch,
}

impl SyncVerdict {
    /// Whether applying this verdict derives new metrics (and so needs weight).
    pub fn requires_derivation(self) -> bool {
        matches!(self, Self::Create | Self::RaiseSteps)
    }
}

/// Compare a validated report against the stored record.
pub fn classify(existing: Option<&DayRecord>, report: &ValidatedReport) -> SyncVerdict {
    let Some(existing) = existing else {
        return SyncVerdict::Create;
    };

    if report.sync_sequence <= existing.sync_sequence {
        return SyncVerdict::Stale;
    }

    if report
        .known_version
        .is_some_and(|known| known != existing.version)
    {
        return SyncVerdict::VersionMismatch;
    }

    if report.steps > existing.steps {
        SyncVerdict::RaiseSteps
    } else {
        SyncVerdict::RetainHigher
    }
}

/// What the engine must do with the store for one report.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncDecision {
    /// Insert a brand-new record
    Create(DayRecord),
    /// Conditionally overwrite with a higher count
    RaiseSteps { updated: DayRecord, previous: DayRecord },
    /// Conditionally advance the sequence, keeping the stored count
    RetainHigher { updated: DayRecord, previous: DayRecord },
    /// Nothing to write; the report was stale
    Stale(DayRecord),
    /// Nothing to write; the client must pull first
    VersionMismatch(DayRecord),
}

/// Build the decision for a verdict. `existing` must be present for every
/// verdict except [`SyncVerdict::Create`].
pub fn apply(
    verdict: SyncVerdict,
    existing: Option<&DayRecord>,
    user_id: Uuid,
    report: &ValidatedReport,
    weight_kg: Option<f64>,
    now: DateTime<Utc>,
) -> SyncDecision {
    match (verdict, existing) {
        (SyncVerdict::Create, _) | (_, None) => SyncDecision::Create(DayRecord::new(
            user_id,
            report.date,
            report.steps,
            report.data_source.clone(),
            report.sync_sequence,
            weight_kg,
            now,
        )),
        (SyncVerdict::RaiseSteps, Some(current)) => SyncDecision::RaiseSteps {
            updated: current.with_steps(
                report.steps,
                report.data_source.clone(),
                report.sync_sequence,
                weight_kg,
                now,
            ),
            previous: current.clone(),
        },
        (SyncVerdict::RetainHigher, Some(current)) => SyncDecision::RetainHigher {
            updated: current.with_acknowledged_sequence(report.sync_sequence, now),
            previous: current.clone(),
        },
        (SyncVerdict::Stale, Some(current)) => SyncDecision::Stale(current.clone()),
        (SyncVerdict::VersionMismatch, Some(current)) => {
            SyncDecision::VersionMismatch(current.clone())
        }
    }
}

/// Classify and apply in one step, for callers that already know the weight.
pub fn decide(
    existing: Option<&DayRecord>,
    user_id: Uuid,
    report: &ValidatedReport,
    weight_kg: Option<f64>,
    now: DateTime<Utc>,
) -> SyncDecision {
    apply(classify(existing, report), existing, user_id, report, weight_kg, now)
}
