use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;

/// External service that maintains a user's derived activity tier.
///
/// `recalculate` is idempotent and safe to call redundantly.
#[async_trait]
pub trait ActivityLevelService: Send + Sync {
    async fn recalculate(&self, user_id: Uuid) -> DomainResult<()>;
}
