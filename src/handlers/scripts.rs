use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::models::VrrpScript;
use crate::AppState;

use super::{orchestrator, ApiError, MessageResponse};

fn same_name(name: &str, script: &VrrpScript) -> Result<(), ApiError> {
    if name != script.name {
        return Err(ApiError::bad_request("name in url and json are not same"));
    }
    Ok(())
}

pub async fn add_vrrp_script(
    _auth: crate::auth::AuthUser,
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(script): Json<VrrpScript>,
) -> Result<Json<MessageResponse>, ApiError> {
    same_name(&name, &script)?;
    orchestrator(&state)?.add_script(&script).await?;
    Ok(MessageResponse::new(format!("vrrp script {} added", name)))
}

pub async fn remove_vrrp_script(
    _auth: crate::auth::AuthUser,
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(script): Json<VrrpScript>,
) -> Result<Json<MessageResponse>, ApiError> {
    same_name(&name, &script)?;
    orchestrator(&state)?.remove_script(&name).await?;
    Ok(MessageResponse::new(format!("vrrp script {} removed", name)))
}

pub async fn change_vrrp_script(
    _auth: crate::auth::AuthUser,
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(script): Json<VrrpScript>,
) -> Result<Json<MessageResponse>, ApiError> {
    same_name(&name, &script)?;
    orchestrator(&state)?.change_script(&script).await?;
    Ok(MessageResponse::new(format!("vrrp script {} changed", name)))
}

/// The master's parsed script, provided the slave holds the same file
pub async fn check_vrrp_script(
    _auth: crate::auth::AuthUser,
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<VrrpScript>, ApiError> {
    let script = orchestrator(&state)?.check_script(&name).await?;
    Ok(Json(script))
}
