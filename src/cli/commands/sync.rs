//! Implementation of the `stepsync sync` command.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use uuid::Uuid;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, SyncReport, SyncResult};

/// How long a one-shot sync waits for the activity-level request to finish
const NOTIFY_GRACE: Duration = Duration::from_secs(3);

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// User the report belongs to
    #[arg(long)]
    pub user: Uuid,

    /// Device's step count for the day
    #[arg(long, allow_negative_numbers = true)]
    pub steps: i64,

    /// Device's monotonically increasing sync counter
    #[arg(long, allow_negative_numbers = true)]
    pub sequence: i64,

    /// Reporting device or app
    #[arg(long, default_value = "")]
    pub source: String,

    /// Day the steps belong to (defaults to today, UTC)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Version the device last saw for this day
    #[arg(long)]
    pub known_version: Option<u64>,
}

impl From<&SyncArgs> for SyncReport {
    fn from(args: &SyncArgs) -> Self {
        let mut report = Self::new(args.steps, args.sequence, args.source.clone());
        if let Some(date) = args.date {
            report = report.on(date);
        }
        if let Some(version) = args.known_version {
            report = report.with_known_version(version);
        }
        report
    }
}

impl CommandOutput for SyncResult {
    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("{} {}: {}", self.date, self.status, self.message),
            format!("  steps:          {}", self.steps),
            format!("  distance:       {:.2} km", self.metrics.distance_km),
            format!("  calories:       {} kcal", self.metrics.kcal),
            format!("  active minutes: {}", self.metrics.active_minutes),
        ];
        if self.version > 0 {
            lines.push(format!(
                "  version:        {} (sequence {})",
                self.version, self.sync_sequence
            ));
        }
        lines.push(format!("  source:         {}", self.data_source));
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: SyncArgs, config: &Config, json_mode: bool) -> Result<()> {
    let api = super::open_services(config).await?;
    let report = SyncReport::from(&args);

    let result = api
        .sync
        .sync(args.user, &report)
        .await
        .context("Step sync failed")?;

    // The runtime shuts down when this command returns.
    if !api.sync.flush_notifications(NOTIFY_GRACE).await {
        tracing::warn!(
            user_id = %args.user,
            "activity level recalculation still running at exit, it may not be delivered"
        );
    }

    output(&result, json_mode);
    Ok(())
}
