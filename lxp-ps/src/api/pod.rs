//! Pod connection, sync and read-back endpoints
//!
//! Every handler acts on the caller's own record; there is no way to address
//! another user.

use axum::{
    body::Bytes,
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;

use crate::api::CallerId;
use crate::error::{ApiError, ApiResult};
use crate::models::{ConnectRequest, PodData, PodStatus, PurgeResult, SyncRequest, SyncResult};
use crate::AppState;

/// POST /api/pod/connect
pub async fn connect(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    body: Bytes,
) -> ApiResult<Json<PodStatus>> {
    let request: ConnectRequest = parse_body(&body)?;
    Ok(Json(state.service.connect(&user_id, request).await?))
}

/// POST /api/pod/disconnect
pub async fn disconnect(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
) -> ApiResult<Json<PodStatus>> {
    Ok(Json(state.service.disconnect(&user_id).await?))
}

/// GET /api/pod/status
pub async fn status(State(state): State<AppState>, CallerId(user_id): CallerId) -> ApiResult<Json<PodStatus>> {
    Ok(Json(state.service.status(&user_id).await?))
}

/// POST /api/pod/sync
///
/// Partial failure is still a 200; the per-step errors are in the body.
pub async fn sync(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    body: Bytes,
) -> ApiResult<Json<SyncResult>> {
    let request: SyncRequest = parse_body(&body)?;
    Ok(Json(state.service.sync(&user_id, request).await?))
}

/// GET /api/pod/data
pub async fn data(State(state): State<AppState>, CallerId(user_id): CallerId) -> ApiResult<Json<PodData>> {
    Ok(Json(state.service.data(&user_id).await?))
}

/// DELETE /api/pod/data
pub async fn purge(State(state): State<AppState>, CallerId(user_id): CallerId) -> ApiResult<Json<PurgeResult>> {
    Ok(Json(state.service.purge(&user_id).await?))
}

/// Parse a JSON body; an empty body means "all fields defaulted"
fn parse_body<T>(body: &[u8]) -> ApiResult<T>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {}", e)))
}

/// Build Pod routes
pub fn pod_routes() -> Router<AppState> {
    Router::new()
        .route("/api/pod/connect", post(connect))
        .route("/api/pod/disconnect", post(disconnect))
        .route("/api/pod/status", get(status))
        .route("/api/pod/sync", post(sync))
        .route("/api/pod/data", get(data).delete(purge))
}
