//! Slave-side primitives, one endpoint per `ConfigTarget` operation.
//!
//! Queries answer 200 or 404, commands answer 200 or an `ApiError`.
//! The master's `RemoteStateStore` maps these back to typed results.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::models::{InterfaceVrrpSpec, Projection, VrrpScript};
use crate::target::ConfigTarget;
use crate::validate::validate_name;
use crate::AppState;

use super::ApiError;

/// The body with the path's iface and sorted lists
fn spec_for(iface: String, mut spec: InterfaceVrrpSpec) -> Result<InterfaceVrrpSpec, ApiError> {
    validate_name("iface", &iface)?;
    if !spec.vrrp_group.is_empty() {
        validate_name("Vrrp_group", &spec.vrrp_group)?;
    }
    spec.iface = iface;
    spec.normalize();
    Ok(spec)
}

fn answer(found: bool) -> StatusCode {
    if found {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}

pub async fn check_iface_exists(
    State(state): State<Arc<AppState>>,
    Path(iface): Path<String>,
    Json(spec): Json<InterfaceVrrpSpec>,
) -> Result<StatusCode, ApiError> {
    let spec = spec_for(iface, spec)?;
    Ok(answer(state.local.iface_exists(&spec).await?))
}

pub async fn check_iface_ok(
    State(state): State<Arc<AppState>>,
    Path(iface): Path<String>,
    Json(spec): Json<InterfaceVrrpSpec>,
) -> Result<StatusCode, ApiError> {
    let spec = spec_for(iface, spec)?;
    Ok(answer(state.local.iface_matches(&spec, Projection::Full).await?))
}

pub async fn check_iface_without_postup(
    State(state): State<Arc<AppState>>,
    Path(iface): Path<String>,
    Json(spec): Json<InterfaceVrrpSpec>,
) -> Result<StatusCode, ApiError> {
    let spec = spec_for(iface, spec)?;
    Ok(answer(
        state.local.iface_matches(&spec, Projection::WithoutPostUp).await?,
    ))
}

pub async fn add_iface(
    State(state): State<Arc<AppState>>,
    Path(iface): Path<String>,
    Json(spec): Json<InterfaceVrrpSpec>,
) -> Result<StatusCode, ApiError> {
    let spec = spec_for(iface, spec)?;
    state.local.apply_iface(&spec).await?;
    Ok(StatusCode::OK)
}

pub async fn add_iface_file(
    State(state): State<Arc<AppState>>,
    Path(iface): Path<String>,
    Json(spec): Json<InterfaceVrrpSpec>,
) -> Result<StatusCode, ApiError> {
    let spec = spec_for(iface, spec)?;
    state.local.apply_iface_file(&spec).await?;
    Ok(StatusCode::OK)
}

pub async fn remove_iface(
    State(state): State<Arc<AppState>>,
    Path(iface): Path<String>,
    Json(spec): Json<InterfaceVrrpSpec>,
) -> Result<StatusCode, ApiError> {
    let spec = spec_for(iface, spec)?;
    state.local.remove_iface(&spec).await?;
    Ok(StatusCode::OK)
}

pub async fn remove_iface_file(
    State(state): State<Arc<AppState>>,
    Path(iface): Path<String>,
    Json(spec): Json<InterfaceVrrpSpec>,
) -> Result<StatusCode, ApiError> {
    let spec = spec_for(iface, spec)?;
    state.local.remove_iface_file(&spec).await?;
    Ok(StatusCode::OK)
}

pub async fn change_iface_postup(
    State(state): State<Arc<AppState>>,
    Path(iface): Path<String>,
    Json(spec): Json<InterfaceVrrpSpec>,
) -> Result<StatusCode, ApiError> {
    let spec = spec_for(iface, spec)?;
    state.local.reconcile_post_up(&spec).await?;
    Ok(StatusCode::OK)
}

pub async fn check_vrrp_exists(
    State(state): State<Arc<AppState>>,
    Path(iface): Path<String>,
    Json(spec): Json<InterfaceVrrpSpec>,
) -> Result<StatusCode, ApiError> {
    let spec = spec_for(iface, spec)?;
    Ok(answer(state.local.vrrp_exists(&spec).await?))
}

/// 200 with the other group's name as plain text, 404 if there is none
pub async fn check_vrrp_exists_other_vg(
    State(state): State<Arc<AppState>>,
    Path(iface): Path<String>,
    Json(spec): Json<InterfaceVrrpSpec>,
) -> Result<Response, ApiError> {
    let spec = spec_for(iface, spec)?;
    Ok(match state.local.vrrp_group_elsewhere(&spec).await? {
        Some(group) => (StatusCode::OK, group).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    })
}

pub async fn check_vrrp_ok(
    State(state): State<Arc<AppState>>,
    Path(iface): Path<String>,
    Json(spec): Json<InterfaceVrrpSpec>,
) -> Result<StatusCode, ApiError> {
    let spec = spec_for(iface, spec)?;
    Ok(answer(state.local.vrrp_matches(&spec, Projection::Full).await?))
}

pub async fn check_vrrp_without_sync(
    State(state): State<Arc<AppState>>,
    Path(iface): Path<String>,
    Json(spec): Json<InterfaceVrrpSpec>,
) -> Result<StatusCode, ApiError> {
    let spec = spec_for(iface, spec)?;
    Ok(answer(
        state
            .local
            .vrrp_matches(&spec, Projection::WithoutInterfaceLine)
            .await?,
    ))
}

pub async fn add_vrrp(
    State(state): State<Arc<AppState>>,
    Path(iface): Path<String>,
    Json(spec): Json<InterfaceVrrpSpec>,
) -> Result<StatusCode, ApiError> {
    let spec = spec_for(iface, spec)?;
    state.local.add_vrrp(&spec).await?;
    Ok(StatusCode::OK)
}

pub async fn remove_vrrp(
    State(state): State<Arc<AppState>>,
    Path(iface): Path<String>,
    Json(spec): Json<InterfaceVrrpSpec>,
) -> Result<StatusCode, ApiError> {
    let spec = spec_for(iface, spec)?;
    state.local.remove_vrrp(&spec).await?;
    Ok(StatusCode::OK)
}

pub async fn reload_vrrp(State(state): State<Arc<AppState>>) -> Result<StatusCode, ApiError> {
    state.local.reload_vrrp().await?;
    Ok(StatusCode::OK)
}

pub async fn sync_group_reload_vrrp(
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, ApiError> {
    state.local.reconcile_sync_groups().await?;
    Ok(StatusCode::OK)
}

pub async fn check_vrrp_script_exists(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    validate_name("script name", &name)?;
    Ok(answer(state.local.script_exists(&name).await?))
}

pub async fn check_vrrp_script_ok(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(mut script): Json<VrrpScript>,
) -> Result<StatusCode, ApiError> {
    validate_name("script name", &name)?;
    script.name = name;
    Ok(answer(state.local.script_matches(&script).await?))
}

pub async fn add_vrrp_script(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(mut script): Json<VrrpScript>,
) -> Result<StatusCode, ApiError> {
    script.name = name;
    crate::validate::validate_script(&script)?;
    state.local.add_script(&script).await?;
    Ok(StatusCode::OK)
}

pub async fn remove_vrrp_script(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    validate_name("script name", &name)?;
    state.local.remove_script(&name).await?;
    Ok(StatusCode::OK)
}

pub async fn read_vrrp_script(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<VrrpScript>, ApiError> {
    validate_name("script name", &name)?;
    Ok(Json(state.local.read_script(&name).await?))
}
