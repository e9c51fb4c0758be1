use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;

/// Source of a user's current body weight.
#[async_trait]
pub trait WeightProvider: Send + Sync {
    /// Latest known weight in kilograms, `None` if the user never logged one.
    async fn latest_weight_kg(&self, user_id: Uuid) -> DomainResult<Option<f64>>;
}
