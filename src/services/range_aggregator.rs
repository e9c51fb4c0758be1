//! Range aggregation over a user's day records.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{round2, DaySummary, RangeSummary, SyncConfig};
use crate::domain::ports::DayRecordRepository;

pub struct RangeAggregator<R: DayRecordRepository> {
    repository: Arc<R>,
    max_range_days: u32,
}

impl<R: DayRecordRepository> RangeAggregator<R> {
    pub fn new(repository: Arc<R>, config: &SyncConfig) -> Self {
        Self {
            repository,
            max_range_days: config.max_range_days,
        }
    }

    /// Totals and one entry per calendar day of the inclusive range.
    ///
    /// Inverted bounds are swapped. Days without a stored record appear as
    /// zero-valued entries, so the result always has `to - from + 1` items.
    pub async fn range(&self, user_id: Uuid, from: NaiveDate, to: NaiveDate) -> DomainResult<RangeSummary> {
        let (from, to) = if from <= to { (from, to) } else { (to, from) };

        let day_count = u64::try_from((to - from).num_days() + 1).unwrap_or(u64::MAX);
        if day_count > u64::from(self.max_range_days) {
            return Err(DomainError::InvalidParameter(format!(
                "range spans {day_count} days, at most {} allowed",
                self.max_range_days
            )));
        }

        let mut stored: HashMap<NaiveDate, DaySummary> = self
            .repository
            .list_range(user_id, from, to)
            .await?
            .iter()
            .map(|r| (r.date, DaySummary::from(r)))
            .collect();

        let items: Vec<DaySummary> = from
            .iter_days()
            .take_while(|d| *d <= to)
            .map(|d| stored.remove(&d).unwrap_or_else(|| DaySummary::empty(d)))
            .collect();

        let total_steps: u64 = items.iter().map(|d| u64::from(d.steps)).sum();
        let total_kcal: u64 = items.iter().map(|d| u64::from(d.metrics.kcal)).sum();
        let total_distance_km = round2(items.iter().map(|d| d.metrics.distance_km).sum());

        tracing::debug!(%user_id, %from, %to, recorded = items.iter().filter(|d| d.is_recorded()).count(), "range aggregated");

        Ok(RangeSummary {
            avg_daily_steps: total_steps / day_count,
            items,
            total_steps,
            total_distance_km,
            total_kcal,
        })
    }
}
