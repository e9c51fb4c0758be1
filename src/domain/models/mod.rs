pub mod config;
pub mod day_record;
pub mod metrics;
pub mod outcome;
pub mod sync;

pub use config::{
    CollaboratorsConfig, Config, DatabaseConfig, LoggingConfig, ServerConfig, SyncConfig,
};
pub use day_record::{now_micros, DayRecord, DaySummary, RecordVersion, NO_DATA_SOURCE};
pub use metrics::{derive, round2, DerivedMetrics};
pub use outcome::{BatchSyncResult, PullResult, RangeSummary, SyncResult, SyncStatus};
pub use sync::{
    apply, classify, decide, SyncDecision, SyncReport, SyncVerdict, ValidatedReport,
    MAX_DAILY_STEPS,
};
