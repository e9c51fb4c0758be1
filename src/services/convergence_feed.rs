//! Convergence feed: lets an offline device catch up on changed days.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{PullResult, SyncConfig};
use crate::domain::ports::DayRecordRepository;

pub struct ConvergenceFeed<R: DayRecordRepository> {
    repository: Arc<R>,
    page_size: usize,
    lookback: Duration,
}

impl<R: DayRecordRepository> ConvergenceFeed<R> {
    pub fn new(repository: Arc<R>, config: &SyncConfig) -> Self {
        Self {
            repository,
            page_size: config.pull_page_size.max(1),
            lookback: Duration::days(i64::from(config.pull_lookback_days)),
        }
    }

    /// Records changed after `since` (default: the look-back window), newest first.
    ///
    /// `latest_timestamp` is the cursor for the next call: the newest
    /// `updated_at` returned, or `since` itself when nothing changed.
    pub async fn pull(&self, user_id: Uuid, since: Option<DateTime<Utc>>) -> DomainResult<PullResult> {
        let since = since.unwrap_or_else(|| {
            Utc::now()
                .checked_sub_signed(self.lookback)
                .unwrap_or(DateTime::<Utc>::MIN_UTC)
        });

        let updates = self
            .repository
            .list_updated_since(user_id, since, self.page_size)
            .await?;

        let latest_timestamp = updates.first().map_or(since, |r| r.updated_at);
        let has_more = updates.len() == self.page_size;

        tracing::debug!(%user_id, %since, returned = updates.len(), has_more, "convergence pull");

        Ok(PullResult {
            updates,
            latest_timestamp,
            has_more,
        })
    }
}
