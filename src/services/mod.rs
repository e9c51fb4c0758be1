//! Service layer: use cases over the day record store.

pub mod activity_notifier;
pub mod convergence_feed;
pub mod range_aggregator;
pub mod step_sync_service;

pub use activity_notifier::ActivityNotifier;
pub use convergence_feed::ConvergenceFeed;
pub use range_aggregator::RangeAggregator;
pub use step_sync_service::StepSyncService;
