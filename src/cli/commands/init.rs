//! Implementation of the `stepsync init` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tokio::fs;

use crate::adapters::sqlite::initialize_database;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::config::CONFIG_DIR;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Force reinitialization even if already initialized
    #[arg(long, short)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub initialized_path: PathBuf,
    pub directories_created: Vec<String>,
    pub config_written: bool,
    pub database_initialized: bool,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        if !self.directories_created.is_empty() {
            lines.push("\nCreated directories:".to_string());
            for dir in &self.directories_created {
                lines.push(format!("  - {dir}"));
            }
        }
        if self.config_written {
            lines.push(format!("\nDefault configuration written to {CONFIG_DIR}/config.yaml"));
        }
        if self.database_initialized {
            lines.push(format!("Database initialized at {CONFIG_DIR}/stepsync.db"));
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: InitArgs, json_mode: bool) -> Result<()> {
    let target_path = if args.path.is_absolute() {
        args.path.clone()
    } else {
        std::env::current_dir()
            .context("Failed to get current directory")?
            .join(&args.path)
    };

    let project_dir = target_path.join(CONFIG_DIR);

    if project_dir.exists() && !args.force {
        let output_data = InitOutput {
            success: false,
            message: "Project already initialized. Use --force to reinitialize.".to_string(),
            initialized_path: target_path,
            directories_created: vec![],
            config_written: false,
            database_initialized: false,
        };
        output(&output_data, json_mode);
        return Ok(());
    }

    if args.force && project_dir.exists() {
        fs::remove_dir_all(&project_dir)
            .await
            .with_context(|| format!("Failed to remove existing {CONFIG_DIR} directory"))?;
    }

    let mut directories_created = vec![];
    for dir in [project_dir.clone(), project_dir.join("logs")] {
        if !dir.exists() {
            fs::create_dir_all(&dir)
                .await
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            let relative = dir
                .strip_prefix(&target_path)
                .unwrap_or(&dir)
                .to_string_lossy()
                .to_string();
            directories_created.push(relative);
        }
    }

    // Paths in the written config stay relative to the project root.
    let config = Config::default();
    let yaml = serde_yaml::to_string(&config).context("Failed to render default configuration")?;
    fs::write(project_dir.join("config.yaml"), yaml)
        .await
        .context("Failed to write config.yaml")?;

    let db_path = project_dir.join("stepsync.db");
    let pool = initialize_database(&format!("sqlite:{}", db_path.display()), None)
        .await
        .context("Failed to initialize database")?;
    pool.close().await;

    let output_data = InitOutput {
        success: true,
        message: if args.force {
            "Project reinitialized successfully.".to_string()
        } else {
            "Project initialized successfully.".to_string()
        },
        initialized_path: target_path,
        directories_created,
        config_written: true,
        database_initialized: true,
    };

    output(&output_data, json_mode);
    Ok(())
}
