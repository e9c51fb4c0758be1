//! CLI command implementations.

pub mod init;
pub mod pull;
pub mod range;
pub mod serve;
pub mod show;
pub mod sync;

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::adapters::collaborators::{activity_level_from_config, weight_provider_from_config};
use crate::adapters::http::SyncApi;
use crate::adapters::sqlite::{initialize_database, PoolConfig, SqliteDayRecordRepository};
use crate::domain::models::Config;
use crate::services::{ActivityNotifier, ConvergenceFeed, RangeAggregator, StepSyncService};

/// Open the configured database and wire the services around it.
pub async fn open_services(config: &Config) -> Result<SyncApi<SqliteDayRecordRepository>> {
    let pool = initialize_database(
        &config.database.url(),
        Some(PoolConfig::from(&config.database)),
    )
    .await
    .with_context(|| format!("Failed to open database at {}", config.database.path))?;
    let repository = Arc::new(SqliteDayRecordRepository::new(pool));

    let weights = weight_provider_from_config(&config.collaborators)
        .context("Failed to configure weight service client")?;
    let activity = activity_level_from_config(&config.collaborators)
        .context("Failed to configure activity-level service client")?;

    Ok(SyncApi {
        sync: StepSyncService::new(
            Arc::clone(&repository),
            weights,
            ActivityNotifier::new(activity),
            &config.sync,
        ),
        feed: ConvergenceFeed::new(Arc::clone(&repository), &config.sync),
        ranges: RangeAggregator::new(repository, &config.sync),
    })
}
