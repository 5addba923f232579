use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::models::InterfaceVrrpSpec;
use crate::orchestrator::CheckOutcome;
use crate::AppState;

use super::{orchestrator, ApiError, MessageResponse};

fn with_iface(iface: String, mut spec: InterfaceVrrpSpec) -> InterfaceVrrpSpec {
    spec.iface = iface;
    spec
}

/// Create the interface and VRRP instance on both nodes
pub async fn add_iface_vrrp(
    _auth: crate::auth::AuthUser,
    State(state): State<Arc<AppState>>,
    Path(iface): Path<String>,
    Json(spec): Json<InterfaceVrrpSpec>,
) -> Result<Json<MessageResponse>, ApiError> {
    let spec = with_iface(iface, spec);
    orchestrator(&state)?.add(&spec).await?;
    Ok(MessageResponse::new(format!("iface {} added", spec.iface)))
}

pub async fn remove_iface_vrrp(
    _auth: crate::auth::AuthUser,
    State(state): State<Arc<AppState>>,
    Path(iface): Path<String>,
    Json(spec): Json<InterfaceVrrpSpec>,
) -> Result<Json<MessageResponse>, ApiError> {
    let spec = with_iface(iface, spec);
    orchestrator(&state)?.remove(&spec).await?;
    Ok(MessageResponse::new(format!("iface {} removed", spec.iface)))
}

/// 200 with the configuration when converged, 206 with masked fields, 404 when absent
pub async fn check_iface_vrrp(
    _auth: crate::auth::AuthUser,
    State(state): State<Arc<AppState>>,
    Path(iface): Path<String>,
    Json(spec): Json<InterfaceVrrpSpec>,
) -> Result<Response, ApiError> {
    let spec = with_iface(iface, spec);
    let response = match orchestrator(&state)?.check(&spec).await? {
        CheckOutcome::Converged(view) => (StatusCode::OK, Json(view)).into_response(),
        CheckOutcome::Partial(view) => (StatusCode::PARTIAL_CONTENT, Json(view)).into_response(),
        CheckOutcome::Absent => {
            return Err(ApiError::not_found(format!("iface {} not found", spec.iface)))
        }
    };
    Ok(response)
}

pub async fn change_iface_vrrp(
    _auth: crate::auth::AuthUser,
    State(state): State<Arc<AppState>>,
    Path(iface): Path<String>,
    Json(spec): Json<InterfaceVrrpSpec>,
) -> Result<Json<MessageResponse>, ApiError> {
    let spec = with_iface(iface, spec);
    orchestrator(&state)?.change(&spec).await?;
    Ok(MessageResponse::new(format!("iface {} changed", spec.iface)))
}

/// Renumber a VRRP instance from `old_id` to the body's `Id_vrrp`
pub async fn moveid_iface_vrrp(
    _auth: crate::auth::AuthUser,
    State(state): State<Arc<AppState>>,
    Path((iface, old_id)): Path<(String, String)>,
    Json(spec): Json<InterfaceVrrpSpec>,
) -> Result<Json<MessageResponse>, ApiError> {
    let spec = with_iface(iface, spec);
    orchestrator(&state)?.move_id(&spec, &old_id).await?;
    Ok(MessageResponse::new(format!(
        "vrrp id {} moved to {} on iface {}",
        old_id, spec.id_vrrp, spec.iface
    )))
}
