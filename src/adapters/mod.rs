//! Infrastructure adapters for external systems.

pub mod collaborators;
pub mod http;
pub mod sqlite;
