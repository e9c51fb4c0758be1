//! HTTP client for the activity-level service.

use async_trait::async_trait;
use reqwest::Client;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::ActivityLevelService;

/// Calls `POST {base}/api/v1/users/{id}/activity-level/recalculate`.
#[derive(Debug, Clone)]
pub struct HttpActivityLevelClient {
    http: Client,
    base_url: String,
}

impl HttpActivityLevelClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ActivityLevelService for HttpActivityLevelClient {
    async fn recalculate(&self, user_id: Uuid) -> DomainResult<()> {
        let url = format!(
            "{}/api/v1/users/{}/activity-level/recalculate",
            self.base_url, user_id
        );

        let resp = self.http.post(&url).send().await.map_err(|e| {
            DomainError::ExternalService(format!("activity level request failed: {e}"))
        })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(DomainError::ExternalService(format!(
                "activity level recalculation returned {status}: {body}"
            )));
        }

        Ok(())
    }
}
