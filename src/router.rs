use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::models::Role;
use crate::AppState;

/// Build the application router for the configured role
pub fn build(state: Arc<AppState>) -> Router {
    let routes = match state.config.role {
        Role::Master => master_routes(),
        Role::Slave => slave_routes(),
    };
    routes
        .route("/health", get(handlers::healthcheck))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

fn master_routes() -> Router<Arc<AppState>> {
    use handlers::{iface_vrrp, scripts};

    Router::new()
        // Interface + VRRP routes
        .route("/add_iface_vrrp/:iface/", post(iface_vrrp::add_iface_vrrp))
        .route("/remove_iface_vrrp/:iface/", post(iface_vrrp::remove_iface_vrrp))
        .route("/check_iface_vrrp/:iface/", post(iface_vrrp::check_iface_vrrp))
        .route("/change_iface_vrrp/:iface/", post(iface_vrrp::change_iface_vrrp))
        .route("/moveid_iface_vrrp/:iface/:old_id/", post(iface_vrrp::moveid_iface_vrrp))
        // VRRP script routes
        .route("/add_vrrp_script/:name/", post(scripts::add_vrrp_script))
        .route("/remove_vrrp_script/:name/", post(scripts::remove_vrrp_script))
        .route("/change_vrrp_script/:name/", post(scripts::change_vrrp_script))
        .route("/check_vrrp_script/:name/", get(scripts::check_vrrp_script))
}

fn slave_routes() -> Router<Arc<AppState>> {
    use handlers::peer;

    Router::new()
        // Interface primitives
        .route("/check_iface_exists/:iface/", post(peer::check_iface_exists))
        .route("/check_iface_ok/:iface/", post(peer::check_iface_ok))
        .route("/check_iface_without_postup/:iface/", post(peer::check_iface_without_postup))
        .route("/add_iface/:iface/", post(peer::add_iface))
        .route("/add_iface_file/:iface/", post(peer::add_iface_file))
        .route("/remove_iface/:iface/", post(peer::remove_iface))
        .route("/remove_iface_file/:iface/", post(peer::remove_iface_file))
        .route("/change_iface_postup/:iface/", post(peer::change_iface_postup))
        // VRRP primitives
        .route("/check_vrrp_exists/:iface/", post(peer::check_vrrp_exists))
        .route("/check_vrrp_exists_otherVG/:iface/", post(peer::check_vrrp_exists_other_vg))
        .route("/check_vrrp_ok/:iface/", post(peer::check_vrrp_ok))
        .route("/check_vrrp_without_sync/:iface/", post(peer::check_vrrp_without_sync))
        .route("/add_vrrp/:iface/", post(peer::add_vrrp))
        .route("/remove_vrrp/:iface/", post(peer::remove_vrrp))
        .route("/reload_vrrp/", get(peer::reload_vrrp))
        .route("/sync_group_reload_vrrp/", get(peer::sync_group_reload_vrrp))
        // VRRP script primitives
        .route("/check_vrrp_script_exists/:name/", post(peer::check_vrrp_script_exists))
        .route("/check_vrrp_script_ok/:name/", post(peer::check_vrrp_script_ok))
        .route("/add_vrrp_script/:name/", post(peer::add_vrrp_script))
        .route("/remove_vrrp_script/:name/", post(peer::remove_vrrp_script))
        .route("/read_vrrp_script/:name/", get(peer::read_vrrp_script))
}
