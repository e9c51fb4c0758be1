//! Command-line interface.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

use commands::{
    init::InitArgs, pull::PullArgs, range::RangeArgs, serve::ServeArgs, show::ShowArgs,
    sync::SyncArgs,
};

/// Multi-device step-count synchronization engine
#[derive(Parser, Debug)]
#[command(name = "stepsync", version, about)]
pub struct Cli {
    /// Emit machine-readable JSON instead of human-readable text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the project directory, default config and database
    Init(InitArgs),
    /// Run the HTTP API
    Serve(ServeArgs),
    /// Submit one step report for a day
    Sync(SyncArgs),
    /// Fetch day records changed since a cursor
    Pull(PullArgs),
    /// Summarize an inclusive date range
    Range(RangeArgs),
    /// Show the stored record of a single day
    Show(ShowArgs),
}

impl Commands {
    /// Whether the command runs until interrupted
    pub const fn is_long_running(&self) -> bool {
        matches!(self, Self::Serve(_))
    }
}

/// Print a command failure and exit with status 1.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = serde_json::json!({
            "success": false,
            "error": format!("{err:#}"),
        });
        eprintln!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
