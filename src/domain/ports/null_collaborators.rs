//! Null collaborator implementations.
//!
//! Used when a collaborator endpoint is not configured but the engine
//! still needs an implementation of the port.

use async_trait::async_trait;
use uuid::Uuid;

use super::{ActivityLevelService, WeightProvider};
use crate::domain::errors::DomainResult;

/// A weight provider that never knows the weight.
#[derive(Debug, Clone, Default)]
pub struct NullWeightProvider;

impl NullWeightProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WeightProvider for NullWeightProvider {
    async fn latest_weight_kg(&self, _user_id: Uuid) -> DomainResult<Option<f64>> {
        Ok(None)
    }
}

/// An activity-level service that ignores every trigger.
#[derive(Debug, Clone, Default)]
pub struct NullActivityLevelService;

impl NullActivityLevelService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ActivityLevelService for NullActivityLevelService {
    async fn recalculate(&self, _user_id: Uuid) -> DomainResult<()> {
        Ok(())
    }
}
