//! HTTP client for the weight-tracking service.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::WeightProvider;

#[derive(Debug, Deserialize)]
struct LatestWeightResponse {
    weight_kg: Option<f64>,
}

/// Reads `GET {base}/api/v1/users/{id}/weight/latest`.
///
/// A 404 means the user never logged a weight.
#[derive(Debug, Clone)]
pub struct HttpWeightClient {
    http: Client,
    base_url: String,
}

impl HttpWeightClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl WeightProvider for HttpWeightClient {
    async fn latest_weight_kg(&self, user_id: Uuid) -> DomainResult<Option<f64>> {
        let url = format!("{}/api/v1/users/{}/weight/latest", self.base_url, user_id);

        let resp = self.http.get(&url).send().await.map_err(|e| {
            DomainError::ExternalService(format!("weight lookup request failed: {e}"))
        })?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(DomainError::ExternalService(format!(
                "weight lookup returned {status}: {body}"
            )));
        }

        let body = resp.json::<LatestWeightResponse>().await.map_err(|e| {
            DomainError::ExternalService(format!("weight lookup parse failed: {e}"))
        })?;
        Ok(body.weight_kg)
    }
}
