//! Common test utilities for integration tests
//!
//! Provides shared fixtures used across multiple integration test files.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use stepsync::adapters::sqlite::{create_migrated_test_pool, SqliteDayRecordRepository};
use stepsync::domain::models::{DayRecord, RecordVersion};
use stepsync::domain::ports::{ActivityLevelService, DayRecordRepository, WeightProvider};
use stepsync::{DomainError, DomainResult};

/// Fresh repository backed by a migrated in-memory database
pub async fn setup_repository() -> Arc<SqliteDayRecordRepository> {
    let pool = create_migrated_test_pool()
        .await
        .expect("Failed to create test pool");
    Arc::new(SqliteDayRecordRepository::new(pool))
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn user() -> Uuid {
    Uuid::new_v4()
}

/// Repository whose writes for one date fail with a storage error
pub struct BrokenDayRepository {
    pub inner: Arc<SqliteDayRecordRepository>,
    pub broken_date: NaiveDate,
}

impl BrokenDayRepository {
    pub fn new(inner: Arc<SqliteDayRecordRepository>, broken_date: NaiveDate) -> Self {
        Self { inner, broken_date }
    }

    fn check(&self, date: NaiveDate) -> DomainResult<()> {
        if date == self.broken_date {
            return Err(DomainError::DatabaseError("disk I/O error".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DayRecordRepository for BrokenDayRepository {
    async fn get(&self, user_id: Uuid, date: NaiveDate) -> DomainResult<Option<DayRecord>> {
        self.inner.get(user_id, date).await
    }

    async fn insert(&self, record: &DayRecord) -> DomainResult<()> {
        self.check(record.date)?;
        self.inner.insert(record).await
    }

    async fn update(&self, record: &DayRecord, expected: RecordVersion) -> DomainResult<()> {
        self.check(record.date)?;
        self.inner.update(record, expected).await
    }

    async fn list_updated_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
        limit: usize,
    ) -> DomainResult<Vec<DayRecord>> {
        self.inner.list_updated_since(user_id, since, limit).await
    }

    async fn list_range(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DomainResult<Vec<DayRecord>> {
        self.inner.list_range(user_id, from, to).await
    }
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Weight provider that always knows the same weight
pub struct FixedWeight(pub f64);

#[async_trait]
impl WeightProvider for FixedWeight {
    async fn latest_weight_kg(&self, _user_id: Uuid) -> DomainResult<Option<f64>> {
        Ok(Some(self.0))
    }
}

/// Weight provider that never answers in time
pub struct HangingWeight;

#[async_trait]
impl WeightProvider for HangingWeight {
    async fn latest_weight_kg(&self, _user_id: Uuid) -> DomainResult<Option<f64>> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(Some(80.0))
    }
}

/// Weight provider whose backend is down
pub struct FailingWeight;

#[async_trait]
impl WeightProvider for FailingWeight {
    async fn latest_weight_kg(&self, _user_id: Uuid) -> DomainResult<Option<f64>> {
        Err(DomainError::ExternalService("weight backend down".to_string()))
    }
}

/// Activity-level service that counts recalculation requests
#[derive(Default)]
pub struct CountingActivity {
    calls: AtomicUsize,
    fail: bool,
}

impl CountingActivity {
    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ActivityLevelService for CountingActivity {
    async fn recalculate(&self, _user_id: Uuid) -> DomainResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DomainError::ExternalService("tier service down".to_string()));
        }
        Ok(())
    }
}

/// Poll `predicate` until it holds or `timeout_ms` elapses.
pub async fn wait_for<F>(mut predicate: F, timeout_ms: u64) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = Duration::from_millis(timeout_ms);

    while start.elapsed() < timeout {
        if predicate() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    predicate()
}
