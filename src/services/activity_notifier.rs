//! Fire-and-forget trigger for the external activity-level recalculation.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::domain::ports::ActivityLevelService;

/// Detaches activity-level recalculation from the sync response path.
#[derive(Clone)]
pub struct ActivityNotifier {
    service: Arc<dyn ActivityLevelService>,
    in_flight: Arc<watch::Sender<usize>>,
}

/// Decrements the in-flight count when a notification task ends, even on panic.
struct InFlightGuard(Arc<watch::Sender<usize>>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.send_modify(|n| *n = n.saturating_sub(1));
    }
}

impl ActivityNotifier {
    pub fn new(service: Arc<dyn ActivityLevelService>) -> Self {
        let (in_flight, _) = watch::channel(0);
        Self {
            service,
            in_flight: Arc::new(in_flight),
        }
    }

    /// Ask for a recalculation of the user's activity tier.
    ///
    /// Runs on its own task; failures are logged and never reach the caller.
    /// The returned handle may be dropped.
    pub fn notify(&self, user_id: Uuid) -> JoinHandle<()> {
        let service = Arc::clone(&self.service);
        self.in_flight.send_modify(|n| *n += 1);
        let guard = InFlightGuard(Arc::clone(&self.in_flight));
        tokio::spawn(async move {
            let _guard = guard;
            match service.recalculate(user_id).await {
                Ok(()) => tracing::debug!(%user_id, "activity level recalculation requested"),
                Err(e) => tracing::warn!(%user_id, error = %e, "activity level recalculation failed"),
            }
        })
    }

    /// Number of recalculation requests still running.
    pub fn pending(&self) -> usize {
        *self.in_flight.borrow()
    }

    /// Wait until every spawned request has finished, at most `timeout`.
    ///
    /// Returns `false` when requests were still running at the deadline.
    /// Short-lived processes call this before the runtime shuts down.
    pub async fn drain(&self, timeout: Duration) -> bool {
        let mut rx = self.in_flight.subscribe();
        let waited = tokio::time::timeout(timeout, rx.wait_for(|n| *n == 0)).await;
        matches!(waited, Ok(Ok(_)))
    }
}
