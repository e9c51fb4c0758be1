//! Step sync HTTP server.
//!
//! Exposes single and batch sync, the convergence feed, range aggregation
//! and single-day lookup for client devices.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::models::{BatchSyncResult, DayRecord, PullResult, RangeSummary, ServerConfig, SyncReport, SyncResult};
use crate::domain::ports::DayRecordRepository;
use crate::services::{ConvergenceFeed, RangeAggregator, StepSyncService};

/// Request carrying several reports at once.
#[derive(Debug, Deserialize, Serialize)]
pub struct BatchSyncRequest {
    pub reports: Vec<SyncReport>,
}

/// Query parameters for a convergence pull.
#[derive(Debug, Deserialize)]
pub struct PullParams {
    #[serde(default)]
    pub since: Option<DateTime<Utc>>,
}

/// Query parameters for a range query.
#[derive(Debug, Deserialize)]
pub struct RangeParams {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(err: &DomainError) -> ApiError {
    let (status, code) = match err {
        DomainError::InvalidParameter(_) => (StatusCode::BAD_REQUEST, "INVALID_PARAMETER"),
        DomainError::ConcurrencyConflict { .. } => (StatusCode::CONFLICT, "CONFLICT"),
        DomainError::ExternalService(_) => (StatusCode::BAD_GATEWAY, "EXTERNAL_SERVICE_ERROR"),
        DomainError::DatabaseError(_) | DomainError::SerializationError(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        }
    };

    if status.is_server_error() {
        tracing::error!(error = %err, "request failed");
    }

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            code: code.to_string(),
        }),
    )
}

/// Malformed body, query string or path segment.
fn reject(rejection: impl std::fmt::Display) -> ApiError {
    let error = rejection.to_string();
    tracing::debug!(%error, "request rejected");
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error,
            code: "INVALID_PARAMETER".to_string(),
        }),
    )
}

/// The services behind the HTTP API.
pub struct SyncApi<R: DayRecordRepository> {
    pub sync: StepSyncService<R>,
    pub feed: ConvergenceFeed<R>,
    pub ranges: RangeAggregator<R>,
}

/// Step sync HTTP server.
pub struct SyncHttpServer<R: DayRecordRepository + 'static> {
    config: ServerConfig,
    api: Arc<SyncApi<R>>,
}

impl<R: DayRecordRepository + 'static> SyncHttpServer<R> {
    pub fn new(api: SyncApi<R>, config: ServerConfig) -> Self {
        Self {
            config,
            api: Arc::new(api),
        }
    }

    /// Build the router.
    pub fn router(&self) -> Router {
        let app = Router::new()
            .route("/api/v1/users/{user_id}/steps/sync", post(sync_report::<R>))
            .route("/api/v1/users/{user_id}/steps/sync/batch", post(sync_batch::<R>))
            .route("/api/v1/users/{user_id}/steps/pull", get(pull::<R>))
            .route("/api/v1/users/{user_id}/steps/range", get(range::<R>))
            .route("/api/v1/users/{user_id}/steps/days/{date}", get(get_day::<R>))
            .route("/health", get(health_check))
            .with_state(Arc::clone(&self.api));

        if self.config.enable_cors {
            app.layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
                .layer(TraceLayer::new_for_http())
        } else {
            app.layer(TraceLayer::new_for_http())
        }
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    pub async fn serve_with_shutdown<F>(
        self,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;
        let listener = TcpListener::bind(addr).await?;
        self.serve_on(listener, shutdown).await
    }

    /// Serve on an already bound listener.
    pub async fn serve_on<F>(
        self,
        listener: TcpListener,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let router = self.router();
        tracing::info!("step sync HTTP server listening on {}", listener.local_addr()?);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}

// Handler functions

async fn health_check() -> &'static str {
    "OK"
}

async fn sync_report<R: DayRecordRepository + 'static>(
    State(api): State<Arc<SyncApi<R>>>,
    user_id: Result<Path<Uuid>, PathRejection>,
    report: Result<Json<SyncReport>, JsonRejection>,
) -> Result<Json<SyncResult>, ApiError> {
    let Path(user_id) = user_id.map_err(reject)?;
    let Json(report) = report.map_err(reject)?;
    api.sync
        .sync(user_id, &report)
        .await
        .map(Json)
        .map_err(|e| error_response(&e))
}

async fn sync_batch<R: DayRecordRepository + 'static>(
    State(api): State<Arc<SyncApi<R>>>,
    user_id: Result<Path<Uuid>, PathRejection>,
    req: Result<Json<BatchSyncRequest>, JsonRejection>,
) -> Result<Json<BatchSyncResult>, ApiError> {
    let Path(user_id) = user_id.map_err(reject)?;
    let Json(req) = req.map_err(reject)?;
    Ok(Json(api.sync.sync_batch(user_id, &req.reports).await))
}

async fn pull<R: DayRecordRepository + 'static>(
    State(api): State<Arc<SyncApi<R>>>,
    user_id: Result<Path<Uuid>, PathRejection>,
    params: Result<Query<PullParams>, QueryRejection>,
) -> Result<Json<PullResult>, ApiError> {
    let Path(user_id) = user_id.map_err(reject)?;
    let Query(params) = params.map_err(reject)?;
    api.feed
        .pull(user_id, params.since)
        .await
        .map(Json)
        .map_err(|e| error_response(&e))
}

async fn range<R: DayRecordRepository + 'static>(
    State(api): State<Arc<SyncApi<R>>>,
    user_id: Result<Path<Uuid>, PathRejection>,
    params: Result<Query<RangeParams>, QueryRejection>,
) -> Result<Json<RangeSummary>, ApiError> {
    let Path(user_id) = user_id.map_err(reject)?;
    let Query(params) = params.map_err(reject)?;
    api.ranges
        .range(user_id, params.from, params.to)
        .await
        .map(Json)
        .map_err(|e| error_response(&e))
}

async fn get_day<R: DayRecordRepository + 'static>(
    State(api): State<Arc<SyncApi<R>>>,
    path: Result<Path<(Uuid, NaiveDate)>, PathRejection>,
) -> Result<Json<DayRecord>, ApiError> {
    let Path((user_id, date)) = path.map_err(reject)?;
    match api.sync.get_day(user_id, date).await {
        Ok(Some(record)) => Ok(Json(record)),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("No record for {user_id} on {date}"),
                code: "NOT_FOUND".to_string(),
            }),
        )),
        Err(e) => Err(error_response(&e)),
    }
}
