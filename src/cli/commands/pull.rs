//! Implementation of the `stepsync pull` command.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use comfy_table::Cell;
use uuid::Uuid;

use crate::cli::output::{output, table_with_header, CommandOutput};
use crate::domain::models::{Config, PullResult};

#[derive(Args, Debug)]
pub struct PullArgs {
    /// User whose records to fetch
    #[arg(long)]
    pub user: Uuid,

    /// Cursor from a previous pull (RFC 3339); defaults to the look-back window
    #[arg(long)]
    pub since: Option<DateTime<Utc>>,
}

impl CommandOutput for PullResult {
    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        if self.updates.is_empty() {
            lines.push("No changes.".to_string());
        } else {
            let mut table = table_with_header(&["Date", "Steps", "Distance (km)", "kcal", "Version", "Updated"]);
            for record in &self.updates {
                table.add_row(vec![
                    Cell::new(record.date),
                    Cell::new(record.steps),
                    Cell::new(format!("{:.2}", record.metrics.distance_km)),
                    Cell::new(record.metrics.kcal),
                    Cell::new(record.version),
                    Cell::new(record.updated_at.to_rfc3339()),
                ]);
            }
            lines.push(table.to_string());
        }
        lines.push(format!("Next cursor: {}", self.latest_timestamp.to_rfc3339()));
        if self.has_more {
            lines.push("More changes available, pull again with the cursor above.".to_string());
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: PullArgs, config: &Config, json_mode: bool) -> Result<()> {
    let api = super::open_services(config).await?;
    let result = api
        .feed
        .pull(args.user, args.since)
        .await
        .context("Convergence pull failed")?;

    output(&result, json_mode);
    Ok(())
}
