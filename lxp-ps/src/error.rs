//! Error types for lxp-ps
//!
//! `PodSyncError` is what the service operations return. `ApiError` is the
//! HTTP rendering of it: each category carries a fixed, generic message, and
//! the underlying driver/transport text is only ever logged.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::guard::ValidationError;
use crate::pod::PodError;
use crate::provisioner::ProvisionError;

/// Failure of a Pod Sync operation
#[derive(Debug, Error)]
pub enum PodSyncError {
    /// Request rejected before any state change
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    /// Relational store unreachable or failing
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] lxp_common::Error),

    /// Pod server unreachable or returned a non-success status
    #[error("pod transport error: {0}")]
    Transport(#[from] PodError),

    /// Container setup failed; nothing was persisted
    #[error(transparent)]
    Provisioning(#[from] ProvisionError),

    /// Operation needs a connected Pod and the user has none
    #[error("no pod connected")]
    NotConnected,

    /// No identity row for the caller
    #[error("user not found")]
    UserNotFound,
}

/// Result type for Pod Sync operations
pub type PodSyncResult<T> = Result<T, PodSyncError>;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing caller identity (401)
    #[error("Unauthorized")]
    Unauthorized,

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Conflict with current state (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Remote Pod server failed (502)
    #[error("Bad gateway: {0}")]
    BadGateway(String),

    /// Internal server error (500)
    #[error("Internal server error")]
    Internal,
}

impl From<PodSyncError> for ApiError {
    fn from(err: PodSyncError) -> Self {
        match err {
            PodSyncError::Validation(e) => ApiError::BadRequest(e.to_string()),
            PodSyncError::NotConnected => ApiError::Conflict("no pod connected".to_string()),
            PodSyncError::UserNotFound => ApiError::NotFound("user not found".to_string()),
            PodSyncError::Transport(e) => {
                tracing::warn!(error = %e, "Pod server request failed");
                ApiError::BadGateway("pod server unavailable".to_string())
            }
            PodSyncError::Provisioning(e) => {
                tracing::warn!(error = %e, "Pod provisioning failed");
                ApiError::BadGateway("pod provisioning failed".to_string())
            }
            PodSyncError::StorageUnavailable(e) => {
                tracing::error!(error = %e, "Storage unavailable");
                ApiError::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "caller identity required".to_string(),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, "POD_UNAVAILABLE", msg),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_text_is_not_exposed() {
        let err = PodSyncError::StorageUnavailable(lxp_common::Error::Internal(
            "disk I/O error at /var/lib/lxp/lxp.db".to_string(),
        ));
        let api: ApiError = err.into();
        assert!(matches!(api, ApiError::Internal));
        assert!(!api.to_string().contains("/var/lib"));
    }

    #[test]
    fn test_transport_error_text_is_not_exposed() {
        let err = PodSyncError::Transport(PodError::Network(
            "http://10.1.2.3: connection refused".to_string(),
        ));
        match ApiError::from(err) {
            ApiError::BadGateway(msg) => assert_eq!(msg, "pod server unavailable"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_validation_reason_is_returned() {
        let api = ApiError::from(PodSyncError::Validation(ValidationError::UnsupportedScheme));
        match api {
            ApiError::BadRequest(msg) => assert_eq!(msg, "pod_url must use http or https"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
