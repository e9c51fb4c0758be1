//! Results returned by the sync, feed and range operations.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::day_record::{DayRecord, DaySummary};
use super::metrics::DerivedMetrics;

/// Outcome of a single sync decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Accepted,
    Rejected,
    Conflict,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Conflict => "conflict",
        }
    }
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response to one sync report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncResult {
    pub date: NaiveDate,
    pub steps: u32,
    pub version: u64,
    pub sync_sequence: i64,
    pub status: SyncStatus,
    pub message: String,
    #[serde(flatten)]
    pub metrics: DerivedMetrics,
    pub data_source: String,
}

impl SyncResult {
    /// Result describing the given record state.
    pub fn from_record(record: &DayRecord, status: SyncStatus, message: impl Into<String>) -> Self {
        Self {
            date: record.date,
            steps: record.steps,
            version: record.version,
            sync_sequence: record.sync_sequence,
            status,
            message: message.into(),
            metrics: record.metrics,
            data_source: record.data_source.clone(),
        }
    }

    /// Result for a batch item that failed before a record could be read.
    pub fn failed(date: NaiveDate, sync_sequence: i64, data_source: &str, message: impl Into<String>) -> Self {
        Self {
            date,
            steps: 0,
            version: 0,
            sync_sequence,
            status: SyncStatus::Rejected,
            message: message.into(),
            metrics: DerivedMetrics::ZERO,
            data_source: data_source.to_string(),
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.status == SyncStatus::Accepted
    }
}

/// Response to a batch of sync reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSyncResult {
    pub success_count: usize,
    pub failed_count: usize,
    pub results: Vec<SyncResult>,
}

impl FromIterator<SyncResult> for BatchSyncResult {
    fn from_iter<I: IntoIterator<Item = SyncResult>>(iter: I) -> Self {
        let results: Vec<SyncResult> = iter.into_iter().collect();
        let success_count = results.iter().filter(|r| r.is_accepted()).count();
        Self {
            success_count,
            failed_count: results.len() - success_count,
            results,
        }
    }
}

/// Page of records changed since a cursor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullResult {
    pub updates: Vec<DayRecord>,
    /// Cursor for the next pull
    pub latest_timestamp: DateTime<Utc>,
    pub has_more: bool,
}

/// Totals and per-day detail over an inclusive date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeSummary {
    pub items: Vec<DaySummary>,
    pub total_steps: u64,
    pub total_distance_km: f64,
    pub total_kcal: u64,
    pub avg_daily_steps: u64,
}
