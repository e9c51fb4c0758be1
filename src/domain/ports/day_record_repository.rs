//! Day record repository port.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{DayRecord, RecordVersion};

/// Repository interface for day record persistence.
///
/// Carries no business rules; callers decide what to write. Writes are
/// conditional so that concurrent writers to one (user, date) row cannot
/// silently overwrite each other.
#[async_trait]
pub trait DayRecordRepository: Send + Sync {
    /// Get the record of a user for a date.
    async fn get(&self, user_id: Uuid, date: NaiveDate) -> DomainResult<Option<DayRecord>>;

    /// Insert a new record.
    ///
    /// Fails with `ConcurrencyConflict` if a record for the pair already exists.
    async fn insert(&self, record: &DayRecord) -> DomainResult<()>;

    /// Overwrite the row identified by `(record.user_id, record.date)`.
    ///
    /// Only applies if the stored row is still at `expected`; otherwise fails
    /// with `ConcurrencyConflict` and leaves the row untouched.
    async fn update(&self, record: &DayRecord, expected: RecordVersion) -> DomainResult<()>;

    /// Records updated strictly after `since`, most recent first.
    async fn list_updated_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
        limit: usize,
    ) -> DomainResult<Vec<DayRecord>>;

    /// Records with `from <= date <= to`, in date order.
    async fn list_range(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DomainResult<Vec<DayRecord>>;
}
