//! lxp-ps library - Pod Sync service
//!
//! Mirrors a learner's profile, skill snapshot, engagement counters, journey
//! progress and journal reflections into a Solid Pod the learner controls.

use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod connection;
pub mod db;
pub mod error;
pub mod guard;
pub mod models;
pub mod pod;
pub mod provisioner;
pub mod rdf;
pub mod reader;
pub mod readiness;
pub mod service;
pub mod sync;

pub use error::{ApiError, PodSyncError, PodSyncResult};
pub use service::{PodService, PodSettings};

use pod::PodClient;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub service: PodService,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(db: SqlitePool, client: Arc<dyn PodClient>, settings: PodSettings) -> Self {
        Self {
            service: PodService::new(db, client, settings),
            started_at: Instant::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::pod_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
