//! Stepsync - multi-device step-count synchronization engine
//!
//! Several devices report cumulative daily step counts for the same user.
//! Stepsync reconciles them into one authoritative record per user per day
//! under optimistic concurrency, derives distance, calories and active
//! minutes, and lets devices catch up on changes they missed.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Records, the sync policy and port traits
//! - **Service Layer** (`services`): Sync, convergence feed and range use cases
//! - **Adapters** (`adapters`): SQLite store, collaborator clients, HTTP API
//! - **Infrastructure Layer** (`infrastructure`): Configuration and logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use stepsync::adapters::sqlite::{initialize_database, SqliteDayRecordRepository};
//! use stepsync::{StepSyncService, SyncReport};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pool = initialize_database("sqlite:steps.db", None).await?;
//!     let service = StepSyncService::standalone(Arc::new(SqliteDayRecordRepository::new(pool)));
//!     let result = service.sync(uuid::Uuid::new_v4(), &SyncReport::new(4200, 1, "phone")).await?;
//!     println!("{}", result.status);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    BatchSyncResult, Config, DayRecord, DaySummary, DerivedMetrics, PullResult, RangeSummary,
    SyncReport, SyncResult, SyncStatus,
};
pub use domain::ports::{ActivityLevelService, DayRecordRepository, WeightProvider};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{ActivityNotifier, ConvergenceFeed, RangeAggregator, StepSyncService};
