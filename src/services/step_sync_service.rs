//! Step sync service: the decision engine and batch coordinator.
//!
//! Every report goes through validate -> load -> classify -> (weight lookup)
//! -> apply -> conditional write. A conditional write that loses a race
//! becomes a `Conflict` outcome instead of overwriting the winner.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    apply, classify, now_micros, BatchSyncResult, DayRecord, SyncConfig, SyncDecision, SyncReport,
    SyncResult, SyncStatus,
};
use crate::domain::ports::{
    DayRecordRepository, NullActivityLevelService, NullWeightProvider, WeightProvider,
};
use crate::services::ActivityNotifier;

pub const MSG_CREATED: &str = "created";
pub const MSG_RAISED: &str = "step count updated";
pub const MSG_RETAINED: &str = "recorded, existing higher count retained";
pub const MSG_STALE: &str = "stale sync sequence";
pub const MSG_VERSION_MISMATCH: &str = "version mismatch - pull latest before retrying";
pub const MSG_CONCURRENT_UPDATE: &str = "concurrent update detected - pull latest before retrying";

/// Today's calendar date in UTC.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub struct StepSyncService<R: DayRecordRepository> {
    repository: Arc<R>,
    weights: Arc<dyn WeightProvider>,
    notifier: ActivityNotifier,
    weight_timeout: Duration,
}

impl<R: DayRecordRepository> StepSyncService<R> {
    pub fn new(
        repository: Arc<R>,
        weights: Arc<dyn WeightProvider>,
        notifier: ActivityNotifier,
        config: &SyncConfig,
    ) -> Self {
        Self {
            repository,
            weights,
            notifier,
            weight_timeout: Duration::from_millis(config.weight_lookup_timeout_ms),
        }
    }

    /// Service without collaborators: weight is always unknown and no
    /// activity-level notifications are sent.
    pub fn standalone(repository: Arc<R>) -> Self {
        Self::new(
            repository,
            Arc::new(NullWeightProvider::new()),
            ActivityNotifier::new(Arc::new(NullActivityLevelService::new())),
            &SyncConfig::default(),
        )
    }

    /// Apply a single report for a user.
    ///
    /// Fails only for invalid input or infrastructure errors; stale and
    /// conflicting reports are successful calls with a non-accepted status.
    #[tracing::instrument(skip(self, report), fields(sync_sequence = report.sync_sequence))]
    pub async fn sync(&self, user_id: Uuid, report: &SyncReport) -> DomainResult<SyncResult> {
        let report = report.validate(today())?;

        let existing = self.repository.get(user_id, report.date).await?;
        let verdict = classify(existing.as_ref(), &report);

        let weight_kg = if verdict.requires_derivation() {
            self.lookup_weight(user_id).await
        } else {
            None
        };

        let decision = apply(verdict, existing.as_ref(), user_id, &report, weight_kg, now_micros());
        let result = self.persist(user_id, decision).await?;

        tracing::info!(
            date = %result.date,
            status = %result.status,
            steps = result.steps,
            version = result.version,
            "step sync processed"
        );
        Ok(result)
    }

    /// Apply reports one after another; a failing item never aborts the rest.
    pub async fn sync_batch(&self, user_id: Uuid, reports: &[SyncReport]) -> BatchSyncResult {
        let mut results = Vec::with_capacity(reports.len());

        for report in reports {
            let result = match self.sync(user_id, report).await {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!(%user_id, sync_sequence = report.sync_sequence, error = %e, "batch item failed");
                    SyncResult::failed(
                        report.effective_date(today()),
                        report.sync_sequence,
                        &report.data_source,
                        e.to_string(),
                    )
                }
            };
            results.push(result);
        }

        let batch: BatchSyncResult = results.into_iter().collect();
        tracing::info!(
            %user_id,
            success_count = batch.success_count,
            failed_count = batch.failed_count,
            "step sync batch processed"
        );
        batch
    }

    /// Wait for outstanding activity-level notifications, at most `timeout`.
    ///
    /// Returns `false` if some were still running at the deadline.
    pub async fn flush_notifications(&self, timeout: Duration) -> bool {
        self.notifier.drain(timeout).await
    }

    /// Get the stored record of a single day.
    pub async fn get_day(&self, user_id: Uuid, date: NaiveDate) -> DomainResult<Option<DayRecord>> {
        self.repository.get(user_id, date).await
    }

    async fn persist(&self, user_id: Uuid, decision: SyncDecision) -> DomainResult<SyncResult> {
        match decision {
            SyncDecision::Create(record) => match self.repository.insert(&record).await {
                Ok(()) => {
                    self.notifier.notify(user_id);
                    Ok(SyncResult::from_record(&record, SyncStatus::Accepted, MSG_CREATED))
                }
                Err(e) if e.is_concurrency_conflict() => self.lost_race(&record).await,
                Err(e) => Err(e),
            },
            SyncDecision::RaiseSteps { updated, previous } => {
                match self.repository.update(&updated, previous.record_version()).await {
                    Ok(()) => {
                        self.notifier.notify(user_id);
                        Ok(SyncResult::from_record(&updated, SyncStatus::Accepted, MSG_RAISED))
                    }
                    Err(e) if e.is_concurrency_conflict() => self.lost_race(&previous).await,
                    Err(e) => Err(e),
                }
            }
            SyncDecision::RetainHigher { updated, previous } => {
                match self.repository.update(&updated, previous.record_version()).await {
                    Ok(()) => Ok(SyncResult::from_record(&updated, SyncStatus::Accepted, MSG_RETAINED)),
                    Err(e) if e.is_concurrency_conflict() => self.lost_race(&previous).await,
                    Err(e) => Err(e),
                }
            }
            SyncDecision::Stale(current) => {
                Ok(SyncResult::from_record(&current, SyncStatus::Rejected, MSG_STALE))
            }
            SyncDecision::VersionMismatch(current) => {
                Ok(SyncResult::from_record(&current, SyncStatus::Conflict, MSG_VERSION_MISMATCH))
            }
        }
    }

    /// Report the row a concurrent writer left behind.
    async fn lost_race(&self, attempted: &DayRecord) -> DomainResult<SyncResult> {
        tracing::warn!(
            user_id = %attempted.user_id,
            date = %attempted.date,
            "conditional write lost to a concurrent update"
        );
        let current = self
            .repository
            .get(attempted.user_id, attempted.date)
            .await?
            .unwrap_or_else(|| attempted.clone());
        Ok(SyncResult::from_record(&current, SyncStatus::Conflict, MSG_CONCURRENT_UPDATE))
    }

    /// Weight for calorie derivation; any failure degrades to unknown.
    async fn lookup_weight(&self, user_id: Uuid) -> Option<f64> {
        match tokio::time::timeout(self.weight_timeout, self.weights.latest_weight_kg(user_id)).await {
            Ok(Ok(weight)) => weight.filter(|w| w.is_finite() && *w > 0.0),
            Ok(Err(e)) => {
                tracing::warn!(%user_id, error = %e, "weight lookup failed, deriving without weight");
                None
            }
            Err(_) => {
                tracing::warn!(
                    %user_id,
                    timeout_ms = u64::try_from(self.weight_timeout.as_millis()).unwrap_or(u64::MAX),
                    "weight lookup timed out, deriving without weight"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::DateTime;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use crate::adapters::sqlite::{create_migrated_test_pool, SqliteDayRecordRepository};
    use crate::domain::errors::DomainError;
    use crate::domain::models::RecordVersion;
    use crate::domain::ports::ActivityLevelService;

    struct FixedWeight(Option<f64>);

    #[async_trait]
    impl WeightProvider for FixedWeight {
        async fn latest_weight_kg(&self, _user_id: Uuid) -> DomainResult<Option<f64>> {
            Ok(self.0)
        }
    }

    struct FailingWeight;

    #[async_trait]
    impl WeightProvider for FailingWeight {
        async fn latest_weight_kg(&self, _user_id: Uuid) -> DomainResult<Option<f64>> {
            Err(DomainError::ExternalService("weight service unavailable".to_string()))
        }
    }

    struct SlowWeight;

    #[async_trait]
    impl WeightProvider for SlowWeight {
        async fn latest_weight_kg(&self, _user_id: Uuid) -> DomainResult<Option<f64>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Some(70.0))
        }
    }

    #[derive(Default)]
    struct CountingActivity {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ActivityLevelService for CountingActivity {
        async fn recalculate(&self, _user_id: Uuid) -> DomainResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Repository that lets a competing device write right before our first
    /// conditional write.
    struct RacingRepository {
        inner: SqliteDayRecordRepository,
        raced: AtomicBool,
        competing_steps: u32,
    }

    impl RacingRepository {
        async fn race(&self, user_id: Uuid, date: NaiveDate) -> DomainResult<()> {
            if self.raced.swap(true, Ordering::SeqCst) {
                return Ok(());
            }
            match self.inner.get(user_id, date).await? {
                Some(current) => {
                    let competitor = current.with_steps(
                        self.competing_steps,
                        "Competitor",
                        current.sync_sequence + 100,
                        None,
                        now_micros(),
                    );
                    self.inner.update(&competitor, current.record_version()).await
                }
                None => {
                    let competitor = DayRecord::new(user_id, date, self.competing_steps, "Competitor", 100, None, now_micros());
                    self.inner.insert(&competitor).await
                }
            }
        }
    }

    #[async_trait]
    impl DayRecordRepository for RacingRepository {
        async fn get(&self, user_id: Uuid, date: NaiveDate) -> DomainResult<Option<DayRecord>> {
            self.inner.get(user_id, date).await
        }

        async fn insert(&self, record: &DayRecord) -> DomainResult<()> {
            self.race(record.user_id, record.date).await?;
            self.inner.insert(record).await
        }

        async fn update(&self, record: &DayRecord, expected: RecordVersion) -> DomainResult<()> {
            self.race(record.user_id, record.date).await?;
            self.inner.update(record, expected).await
        }

        async fn list_updated_since(&self, user_id: Uuid, since: DateTime<Utc>, limit: usize) -> DomainResult<Vec<DayRecord>> {
            self.inner.list_updated_since(user_id, since, limit).await
        }

        async fn list_range(&self, user_id: Uuid, from: NaiveDate, to: NaiveDate) -> DomainResult<Vec<DayRecord>> {
            self.inner.list_range(user_id, from, to).await
        }
    }

    async fn setup_repo() -> Arc<SqliteDayRecordRepository> {
        let pool = create_migrated_test_pool().await.unwrap();
        Arc::new(SqliteDayRecordRepository::new(pool))
    }

    async fn setup_service() -> StepSyncService<SqliteDayRecordRepository> {
        StepSyncService::standalone(setup_repo().await)
    }

    fn service_with(
        repo: Arc<SqliteDayRecordRepository>,
        weights: Arc<dyn WeightProvider>,
        activity: Arc<CountingActivity>,
        weight_timeout_ms: u64,
    ) -> StepSyncService<SqliteDayRecordRepository> {
        let config = SyncConfig { weight_lookup_timeout_ms: weight_timeout_ms, ..SyncConfig::default() };
        StepSyncService::new(repo, weights, ActivityNotifier::new(activity), &config)
    }

    async fn wait_for_calls(activity: &CountingActivity, expected: usize) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while activity.calls.load(Ordering::SeqCst) < expected && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    fn jan(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[tokio::test]
    async fn test_first_report_creates_record() {
        let service = setup_service().await;
        let user = Uuid::new_v4();

        let result = service.sync(user, &SyncReport::new(3000, 1, "Sensor").on(jan(1))).await.unwrap();

        assert_eq!(result.status, SyncStatus::Accepted);
        assert_eq!(result.version, 1);
        assert_eq!(result.steps, 3000);
        assert_eq!(result.message, MSG_CREATED);
        assert_eq!(result.metrics.active_minutes, 30);
    }

    #[tokio::test]
    async fn test_report_without_date_lands_on_today() {
        let service = setup_service().await;
        let user = Uuid::new_v4();

        let result = service.sync(user, &SyncReport::new(42, 1, "Sensor")).await.unwrap();
        assert_eq!(result.date, today());
        assert!(service.get_day(user, today()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_invalid_steps_fail_before_store_access() {
        let service = setup_service().await;
        let user = Uuid::new_v4();

        let err = service.sync(user, &SyncReport::new(-1, 1, "Sensor").on(jan(1))).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidParameter(_)));
        assert!(service.get_day(user, jan(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stale_report_is_rejected_without_mutation() {
        let service = setup_service().await;
        let user = Uuid::new_v4();
        service.sync(user, &SyncReport::new(3000, 5, "Sensor").on(jan(1))).await.unwrap();
        let before = service.get_day(user, jan(1)).await.unwrap().unwrap();

        let result = service.sync(user, &SyncReport::new(9000, 5, "Watch").on(jan(1))).await.unwrap();
        assert_eq!(result.status, SyncStatus::Rejected);
        assert_eq!(result.message, MSG_STALE);

        let after = service.get_day(user, jan(1)).await.unwrap().unwrap();
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn test_known_version_mismatch_is_a_conflict() {
        let service = setup_service().await;
        let user = Uuid::new_v4();
        service.sync(user, &SyncReport::new(3000, 1, "Sensor").on(jan(1))).await.unwrap();
        service.sync(user, &SyncReport::new(4000, 2, "Sensor").on(jan(1))).await.unwrap();

        let report = SyncReport::new(9000, 3, "Watch").on(jan(1)).with_known_version(1);
        let result = service.sync(user, &report).await.unwrap();

        assert_eq!(result.status, SyncStatus::Conflict);
        assert_eq!(result.version, 2);
        assert_eq!(result.steps, 4000);
        assert_eq!(service.get_day(user, jan(1)).await.unwrap().unwrap().sync_sequence, 2);
    }

    #[tokio::test]
    async fn test_lower_count_with_newer_sequence_is_acknowledged() {
        let service = setup_service().await;
        let user = Uuid::new_v4();
        service.sync(user, &SyncReport::new(8000, 1, "Sensor").on(jan(1))).await.unwrap();
        let before = service.get_day(user, jan(1)).await.unwrap().unwrap();

        let result = service.sync(user, &SyncReport::new(2000, 2, "Watch").on(jan(1))).await.unwrap();
        assert_eq!(result.status, SyncStatus::Accepted);
        assert_eq!(result.message, MSG_RETAINED);
        assert_eq!(result.steps, 8000);

        let after = service.get_day(user, jan(1)).await.unwrap().unwrap();
        assert_eq!(after.steps, 8000);
        assert_eq!(after.data_source, "Sensor");
        assert_eq!(after.sync_sequence, 2);
        assert_eq!(after.version, before.version);
        assert_eq!(after.updated_at, before.updated_at);

        // The acknowledged sequence now guards against replays
        let replay = service.sync(user, &SyncReport::new(9000, 2, "Watch").on(jan(1))).await.unwrap();
        assert_eq!(replay.status, SyncStatus::Rejected);
    }

    #[tokio::test]
    async fn test_weight_feeds_calories() {
        let activity = Arc::new(CountingActivity::default());
        let service = service_with(setup_repo().await, Arc::new(FixedWeight(Some(70.0))), activity, 1000);

        let result = service.sync(Uuid::new_v4(), &SyncReport::new(10_000, 1, "Sensor").on(jan(1))).await.unwrap();
        assert_eq!(result.metrics.kcal, 315);
        assert!((result.metrics.distance_km - 7.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_weight_failure_degrades_to_unknown() {
        let activity = Arc::new(CountingActivity::default());
        let service = service_with(setup_repo().await, Arc::new(FailingWeight), activity, 1000);

        let result = service.sync(Uuid::new_v4(), &SyncReport::new(10_000, 1, "Sensor").on(jan(1))).await.unwrap();
        assert_eq!(result.status, SyncStatus::Accepted);
        assert_eq!(result.metrics.kcal, 0);
    }

    #[tokio::test]
    async fn test_weight_timeout_degrades_to_unknown() {
        let activity = Arc::new(CountingActivity::default());
        let service = service_with(setup_repo().await, Arc::new(SlowWeight), activity, 20);

        let result = service.sync(Uuid::new_v4(), &SyncReport::new(10_000, 1, "Sensor").on(jan(1))).await.unwrap();
        assert_eq!(result.status, SyncStatus::Accepted);
        assert_eq!(result.metrics.kcal, 0);
    }

    #[tokio::test]
    async fn test_notifier_fires_only_on_step_changes() {
        let activity = Arc::new(CountingActivity::default());
        let service = service_with(setup_repo().await, Arc::new(FixedWeight(None)), activity.clone(), 1000);
        let user = Uuid::new_v4();

        service.sync(user, &SyncReport::new(3000, 1, "Sensor").on(jan(1))).await.unwrap();
        service.sync(user, &SyncReport::new(5000, 2, "Sensor").on(jan(1))).await.unwrap();
        wait_for_calls(&activity, 2).await;
        assert_eq!(activity.calls.load(Ordering::SeqCst), 2);

        // Retained, stale and conflicting outcomes do not notify
        service.sync(user, &SyncReport::new(100, 3, "Sensor").on(jan(1))).await.unwrap();
        service.sync(user, &SyncReport::new(100, 1, "Sensor").on(jan(1))).await.unwrap();
        service.sync(user, &SyncReport::new(9000, 4, "Sensor").on(jan(1)).with_known_version(1)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(activity.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_flush_delivers_notification_before_returning() {
        let activity = Arc::new(CountingActivity::default());
        let service = service_with(setup_repo().await, Arc::new(FixedWeight(None)), activity.clone(), 1000);

        service.sync(Uuid::new_v4(), &SyncReport::new(3000, 1, "Sensor").on(jan(2))).await.unwrap();
        assert!(service.flush_notifications(Duration::from_secs(2)).await);
        assert_eq!(activity.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_update_becomes_conflict() {
        let inner = SqliteDayRecordRepository::new(create_migrated_test_pool().await.unwrap());
        let user = Uuid::new_v4();
        inner.insert(&DayRecord::new(user, jan(1), 3000, "Sensor", 1, None, now_micros())).await.unwrap();

        let repo = Arc::new(RacingRepository { inner, raced: AtomicBool::new(false), competing_steps: 7000 });
        let service = StepSyncService::standalone(repo.clone());

        let result = service.sync(user, &SyncReport::new(5000, 2, "Watch").on(jan(1))).await.unwrap();
        assert_eq!(result.status, SyncStatus::Conflict);
        assert_eq!(result.message, MSG_CONCURRENT_UPDATE);
        // The competing write survives and is what the client sees
        assert_eq!(result.steps, 7000);
        assert_eq!(result.version, 2);
        assert_eq!(repo.get(user, jan(1)).await.unwrap().unwrap().steps, 7000);
    }

    #[tokio::test]
    async fn test_concurrent_create_becomes_conflict() {
        let inner = SqliteDayRecordRepository::new(create_migrated_test_pool().await.unwrap());
        let repo = Arc::new(RacingRepository { inner, raced: AtomicBool::new(false), competing_steps: 1200 });
        let service = StepSyncService::standalone(repo.clone());
        let user = Uuid::new_v4();

        let result = service.sync(user, &SyncReport::new(3000, 1, "Sensor").on(jan(1))).await.unwrap();
        assert_eq!(result.status, SyncStatus::Conflict);
        assert_eq!(result.steps, 1200);
        assert_eq!(result.data_source, "Competitor");
    }

    #[tokio::test]
    async fn test_batch_isolates_failures() {
        let service = setup_service().await;
        let user = Uuid::new_v4();
        let reports = vec![
            SyncReport::new(1000, 1, "Sensor").on(jan(1)),
            SyncReport::new(-1, 1, "Sensor").on(jan(2)),
            SyncReport::new(3000, 1, "Sensor").on(jan(3)),
        ];

        let batch = service.sync_batch(user, &reports).await;

        assert_eq!(batch.success_count, 2);
        assert_eq!(batch.failed_count, 1);
        assert_eq!(batch.results[1].status, SyncStatus::Rejected);
        assert!(batch.results[1].message.contains("steps must be between"));
        assert_eq!(batch.results[1].date, jan(2));
        assert!(service.get_day(user, jan(2)).await.unwrap().is_none());
        assert_eq!(service.get_day(user, jan(3)).await.unwrap().unwrap().steps, 3000);
    }
}
