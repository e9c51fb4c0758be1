//! SQLite implementation of the DayRecordRepository.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{format_date, format_timestamp, parse_date, parse_datetime, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{DayRecord, DerivedMetrics, RecordVersion};
use crate::domain::ports::DayRecordRepository;

const SELECT_COLUMNS: &str = "SELECT user_id, date, steps, distance_km, kcal, active_minutes, weight_kg, \
     data_source, sync_sequence, version, synced_at, created_at, updated_at FROM day_records";

#[derive(Clone)]
pub struct SqliteDayRecordRepository {
    pool: SqlitePool,
}

impl SqliteDayRecordRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DayRecordRepository for SqliteDayRecordRepository {
    async fn get(&self, user_id: Uuid, date: NaiveDate) -> DomainResult<Option<DayRecord>> {
        let row: Option<DayRecordRow> = sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE user_id = ? AND date = ?"))
            .bind(user_id.to_string())
            .bind(format_date(date))
            .fetch_optional(&self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn insert(&self, record: &DayRecord) -> DomainResult<()> {
        let result = sqlx::query(
            r#"INSERT INTO day_records (user_id, date, steps, distance_km, kcal, active_minutes, weight_kg,
               data_source, sync_sequence, version, synced_at, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#
        )
        .bind(record.user_id.to_string())
        .bind(format_date(record.date))
        .bind(i64::from(record.steps))
        .bind(record.metrics.distance_km)
        .bind(i64::from(record.metrics.kcal))
        .bind(i64::from(record.metrics.active_minutes))
        .bind(record.weight_kg)
        .bind(&record.data_source)
        .bind(record.sync_sequence)
        .bind(to_db_version(record.version)?)
        .bind(format_timestamp(&record.synced_at))
        .bind(format_timestamp(&record.created_at))
        .bind(format_timestamp(&record.updated_at))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(DomainError::day_record_conflict(record.user_id, record.date))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&self, record: &DayRecord, expected: RecordVersion) -> DomainResult<()> {
        let result = sqlx::query(
            r#"UPDATE day_records SET steps = ?, distance_km = ?, kcal = ?, active_minutes = ?,
               weight_kg = ?, data_source = ?, sync_sequence = ?, version = ?, synced_at = ?, updated_at = ?
               WHERE user_id = ? AND date = ? AND version = ? AND sync_sequence = ?"#
        )
        .bind(i64::from(record.steps))
        .bind(record.metrics.distance_km)
        .bind(i64::from(record.metrics.kcal))
        .bind(i64::from(record.metrics.active_minutes))
        .bind(record.weight_kg)
        .bind(&record.data_source)
        .bind(record.sync_sequence)
        .bind(to_db_version(record.version)?)
        .bind(format_timestamp(&record.synced_at))
        .bind(format_timestamp(&record.updated_at))
        .bind(record.user_id.to_string())
        .bind(format_date(record.date))
        .bind(to_db_version(expected.version)?)
        .bind(expected.sync_sequence)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::day_record_conflict(record.user_id, record.date));
        }

        Ok(())
    }

    async fn list_updated_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
        limit: usize,
    ) -> DomainResult<Vec<DayRecord>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<DayRecordRow> = sqlx::query_as(&format!(
            "{SELECT_COLUMNS} WHERE user_id = ? AND updated_at > ? ORDER BY updated_at DESC, date DESC LIMIT ?"
        ))
        .bind(user_id.to_string())
        .bind(format_timestamp(&since))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn list_range(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DomainResult<Vec<DayRecord>> {
        let rows: Vec<DayRecordRow> = sqlx::query_as(&format!(
            "{SELECT_COLUMNS} WHERE user_id = ? AND date >= ? AND date <= ? ORDER BY date"
        ))
        .bind(user_id.to_string())
        .bind(format_date(from))
        .bind(format_date(to))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

fn to_db_version(version: u64) -> DomainResult<i64> {
    i64::try_from(version).map_err(|_| DomainError::SerializationError(format!("Version out of range: {version}")))
}

fn to_u32(value: i64, column: &str) -> DomainResult<u32> {
    u32::try_from(value).map_err(|_| DomainError::SerializationError(format!("Invalid {column}: {value}")))
}

#[derive(sqlx::FromRow)]
struct DayRecordRow {
    user_id: String,
    date: String,
    steps: i64,
    distance_km: f64,
    kcal: i64,
    active_minutes: i64,
    weight_kg: Option<f64>,
    data_source: String,
    sync_sequence: i64,
    version: i64,
    synced_at: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<DayRecordRow> for DayRecord {
    type Error = DomainError;

    fn try_from(row: DayRecordRow) -> Result<Self, Self::Error> {
        let version = u64::try_from(row.version)
            .map_err(|_| DomainError::SerializationError(format!("Invalid version: {}", row.version)))?;

        Ok(DayRecord {
            user_id: parse_uuid(&row.user_id)?,
            date: parse_date(&row.date)?,
            steps: to_u32(row.steps, "steps")?,
            metrics: DerivedMetrics {
                distance_km: row.distance_km,
                kcal: to_u32(row.kcal, "kcal")?,
                active_minutes: to_u32(row.active_minutes, "active_minutes")?,
            },
            weight_kg: row.weight_kg,
            data_source: row.data_source,
            sync_sequence: row.sync_sequence,
            version,
            synced_at: parse_datetime(&row.synced_at)?,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_datetime(&row.updated_at)?,
        })
    }
}
