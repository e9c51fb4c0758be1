//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that infrastructure adapters must implement:
//! - DayRecordRepository: Persistence of per-user, per-day step records
//! - WeightProvider: Latest body weight lookup
//! - ActivityLevelService: Recalculation trigger for the derived fitness tier

pub mod activity_level;
pub mod day_record_repository;
pub mod null_collaborators;
pub mod weight_provider;

pub use activity_level::ActivityLevelService;
pub use day_record_repository::DayRecordRepository;
pub use null_collaborators::{NullActivityLevelService, NullWeightProvider};
pub use weight_provider::WeightProvider;
