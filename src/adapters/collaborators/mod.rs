//! HTTP clients for the external services the sync engine consumes.

pub mod activity_level_client;
pub mod weight_client;

pub use activity_level_client::HttpActivityLevelClient;
pub use weight_client::HttpWeightClient;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::CollaboratorsConfig;
use crate::domain::ports::{
    ActivityLevelService, NullActivityLevelService, NullWeightProvider, WeightProvider,
};

const USER_AGENT: &str = concat!("stepsync/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client with the configured request timeout.
pub fn build_http_client(timeout: Duration) -> DomainResult<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| DomainError::ExternalService(format!("failed to build HTTP client: {e}")))
}

/// Weight provider for the configuration: HTTP when a URL is set, null otherwise.
pub fn weight_provider_from_config(config: &CollaboratorsConfig) -> DomainResult<Arc<dyn WeightProvider>> {
    match config.weight_service_url.as_deref().filter(|u| !u.trim().is_empty()) {
        Some(url) => {
            let http = build_http_client(Duration::from_millis(config.request_timeout_ms))?;
            Ok(Arc::new(HttpWeightClient::new(http, url)))
        }
        None => {
            tracing::info!("no weight service configured, calories will not be derived");
            Ok(Arc::new(NullWeightProvider::new()))
        }
    }
}

/// Activity-level service for the configuration: HTTP when a URL is set, null otherwise.
pub fn activity_level_from_config(config: &CollaboratorsConfig) -> DomainResult<Arc<dyn ActivityLevelService>> {
    match config.activity_level_url.as_deref().filter(|u| !u.trim().is_empty()) {
        Some(url) => {
            let http = build_http_client(Duration::from_millis(config.request_timeout_ms))?;
            Ok(Arc::new(HttpActivityLevelClient::new(http, url)))
        }
        None => {
            tracing::info!("no activity-level service configured, notifications disabled");
            Ok(Arc::new(NullActivityLevelService::new()))
        }
    }
}
