//! Implementation of the `stepsync serve` command.

use anyhow::{Context, Result};
use clap::Args;

use crate::adapters::http::SyncHttpServer;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::logging::{LogConfig, LoggerImpl};

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind (overrides server.port)
    #[arg(long, short)]
    pub port: Option<u16>,
}

#[derive(Debug, serde::Serialize)]
pub struct ServeOutput {
    pub address: String,
    pub message: String,
}

impl CommandOutput for ServeOutput {
    fn to_human(&self) -> String {
        format!("{} ({})", self.message, self.address)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: ServeArgs, config: &Config, json_mode: bool) -> Result<()> {
    let mut server_config = config.server.clone();
    if let Some(host) = args.host {
        server_config.host = host;
    }
    if let Some(port) = args.port {
        server_config.port = port;
    }
    let address = format!("{}:{}", server_config.host, server_config.port);

    match LoggerImpl::prune(&LogConfig::from(&config.logging)).await {
        Ok(deleted) if deleted > 0 => tracing::info!(deleted, "expired log files removed"),
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "log retention cleanup failed"),
    }

    let api = super::open_services(config).await?;
    let server = SyncHttpServer::new(api, server_config);

    server
        .serve_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
            }
        })
        .await
        .map_err(|e| anyhow::anyhow!(e))
        .with_context(|| format!("HTTP server on {address} failed"))?;

    output(
        &ServeOutput {
            address,
            message: "Server stopped".to_string(),
        },
        json_mode,
    );
    Ok(())
}
