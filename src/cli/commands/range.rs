//! Implementation of the `stepsync range` command.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use comfy_table::{Attribute, Cell};
use uuid::Uuid;

use crate::cli::output::{output, table_with_header, CommandOutput};
use crate::domain::models::{Config, RangeSummary};

#[derive(Args, Debug)]
pub struct RangeArgs {
    /// User whose records to summarize
    #[arg(long)]
    pub user: Uuid,

    /// First day of the range (inclusive)
    #[arg(long)]
    pub from: NaiveDate,

    /// Last day of the range (inclusive)
    #[arg(long)]
    pub to: NaiveDate,
}

impl CommandOutput for RangeSummary {
    fn to_human(&self) -> String {
        let mut table = table_with_header(&["Date", "Steps", "Distance (km)", "kcal", "Active min", "Source"]);
        for day in &self.items {
            let source = if day.is_recorded() { day.data_source.as_str() } else { "-" };
            table.add_row(vec![
                Cell::new(day.date),
                Cell::new(day.steps),
                Cell::new(format!("{:.2}", day.metrics.distance_km)),
                Cell::new(day.metrics.kcal),
                Cell::new(day.metrics.active_minutes),
                Cell::new(source),
            ]);
        }
        table.add_row(vec![
            Cell::new("Total").add_attribute(Attribute::Bold),
            Cell::new(self.total_steps).add_attribute(Attribute::Bold),
            Cell::new(format!("{:.2}", self.total_distance_km)).add_attribute(Attribute::Bold),
            Cell::new(self.total_kcal).add_attribute(Attribute::Bold),
            Cell::new(""),
            Cell::new(""),
        ]);

        format!("{table}\nAverage: {} steps/day", self.avg_daily_steps)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: RangeArgs, config: &Config, json_mode: bool) -> Result<()> {
    let api = super::open_services(config).await?;
    let summary = api
        .ranges
        .range(args.user, args.from, args.to)
        .await
        .context("Range query failed")?;

    output(&summary, json_mode);
    Ok(())
}
