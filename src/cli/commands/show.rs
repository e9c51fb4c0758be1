//! Implementation of the `stepsync show` command.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use uuid::Uuid;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, DayRecord};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// User the record belongs to
    #[arg(long)]
    pub user: Uuid,

    /// Day to show
    #[arg(long)]
    pub date: NaiveDate,
}

#[derive(Debug, serde::Serialize)]
pub struct ShowOutput {
    pub date: NaiveDate,
    pub found: bool,
    pub record: Option<DayRecord>,
}

impl CommandOutput for ShowOutput {
    fn to_human(&self) -> String {
        let Some(record) = &self.record else {
            return format!("No record for {}", self.date);
        };

        let weight = record
            .weight_kg
            .map_or_else(|| "unknown".to_string(), |w| format!("{w:.1} kg"));
        [
            format!("Day:            {}", record.date),
            format!("Steps:          {}", record.steps),
            format!("Distance:       {:.2} km", record.metrics.distance_km),
            format!("Calories:       {} kcal", record.metrics.kcal),
            format!("Active minutes: {}", record.metrics.active_minutes),
            format!("Weight:         {weight}"),
            format!("Source:         {}", record.data_source),
            format!("Version:        {}", record.version),
            format!("Sync sequence:  {}", record.sync_sequence),
            format!("Last synced:    {}", record.synced_at.to_rfc3339()),
            format!("Updated:        {}", record.updated_at.to_rfc3339()),
        ]
        .join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: ShowArgs, config: &Config, json_mode: bool) -> Result<()> {
    let api = super::open_services(config).await?;
    let record = api
        .sync
        .get_day(args.user, args.date)
        .await
        .context("Failed to load day record")?;

    output(
        &ShowOutput {
            date: args.date,
            found: record.is_some(),
            record,
        },
        json_mode,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_record_output() {
        let out = ShowOutput {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            found: false,
            record: None,
        };
        assert_eq!(out.to_human(), "No record for 2024-01-15");
        assert_eq!(out.to_json()["found"], serde_json::json!(false));
    }
}
