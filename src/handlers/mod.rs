pub mod iface_vrrp;
pub mod peer;
pub mod scripts;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::error::ReconcileError;
use crate::orchestrator::Orchestrator;
use crate::AppState;

/// Standard error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// API error type that converts into an HTTP response
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::warn!(status = self.status.as_u16(), "{}", self.message);
        }
        (self.status, Json(ErrorResponse::new(self.message))).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        let status = match err.downcast_ref::<ReconcileError>() {
            Some(
                ReconcileError::Validation(_)
                | ReconcileError::Drift(_)
                | ReconcileError::Unsupported(_),
            ) => StatusCode::BAD_REQUEST,
            Some(ReconcileError::DependencyConflict(_)) => StatusCode::CONFLICT,
            Some(ReconcileError::NotFound(_)) => StatusCode::NOT_FOUND,
            Some(ReconcileError::Transport(_)) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// Simple message response
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// The master-side orchestrator, or 503 on a slave
pub(crate) fn orchestrator(state: &Arc<AppState>) -> Result<&Orchestrator, ApiError> {
    state
        .orchestrator
        .as_ref()
        .ok_or_else(|| ApiError::unavailable("this node does not run the master API"))
}

/// Healthcheck endpoint
pub async fn healthcheck(
    axum::extract::State(state): axum::extract::State<Arc<AppState>>,
) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "lvsnetwork-api",
        "role": state.config.role.as_str(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
