//! HTTP API adapter.

pub mod sync_http;

pub use sync_http::{ErrorResponse, SyncApi, SyncHttpServer};
