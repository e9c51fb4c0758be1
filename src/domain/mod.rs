//! Domain layer for the step synchronization engine
//!
//! This module contains the day-record model, the pure sync decision policy,
//! metric derivation, and the port traits adapters implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
