//! Stepsync CLI entry point.

use clap::Parser;

use stepsync::cli::{commands, handle_error, Cli, Commands};
use stepsync::infrastructure::config::ConfigLoader;
use stepsync::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.json;

    let config = match ConfigLoader::load() {
        Ok(config) => config,
        Err(err) => handle_error(err, json_mode),
    };

    // One-shot commands only surface warnings so their output stays readable.
    let mut log_config = LogConfig::from(&config.logging);
    if !cli.command.is_long_running() {
        log_config.level = "warn".to_string();
    }
    let _logger = match LoggerImpl::init(&log_config) {
        Ok(logger) => logger,
        Err(err) => handle_error(err, json_mode),
    };

    let result = match cli.command {
        Commands::Init(args) => commands::init::execute(args, json_mode).await,
        Commands::Serve(args) => commands::serve::execute(args, &config, json_mode).await,
        Commands::Sync(args) => commands::sync::execute(args, &config, json_mode).await,
        Commands::Pull(args) => commands::pull::execute(args, &config, json_mode).await,
        Commands::Range(args) => commands::range::execute(args, &config, json_mode).await,
        Commands::Show(args) => commands::show::execute(args, &config, json_mode).await,
    };

    if let Err(err) = result {
        handle_error(err, json_mode);
    }
}
