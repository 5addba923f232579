mod auth;
mod config;
mod converge;
mod error;
mod exec;
mod handlers;
mod models;
mod orchestrator;
mod render;
mod router;
mod target;
mod validate;

use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use auth::Htpasswd;
use config::Config;
use exec::{CommandRunner, SystemRunner};
use models::Role;
use orchestrator::Orchestrator;
use target::{LocalStateStore, RemoteStateStore};

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    /// This node's files and processes
    pub local: Arc<LocalStateStore>,
    /// Master only
    pub orchestrator: Option<Orchestrator>,
    pub htpasswd: Option<Htpasswd>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lvsnetwork_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Ok(path) = dotenvy::dotenv() {
        tracing::info!("Loaded environment from {}", path.display());
    }

    // Load configuration
    let cfg = Config::load();
    tracing::info!("Starting LVSNetwork API as {}", cfg.role);
    tracing::info!("Interfaces: {}", cfg.interfaces_dir);
    tracing::info!("Keepalived: {}", cfg.keepalived_dir);
    tracing::info!("Listen: {}", cfg.listen_addr);

    let runner: Arc<dyn CommandRunner> = Arc::new(SystemRunner);

    if cfg.check_ifupdown && !exec::ifquery_supports_state(runner.as_ref()).await? {
        anyhow::bail!("ifquery does not support --state, upgrade ifupdown");
    }
    tokio::fs::create_dir_all(&cfg.keepalived_dir)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create {}: {}", cfg.keepalived_dir, e))?;

    let local = Arc::new(LocalStateStore::new(
        cfg.role,
        cfg.state_paths(),
        runner.clone(),
        cfg.reload_cmd.clone(),
    ));

    let orchestrator = match cfg.role {
        Role::Master => {
            let slave = RemoteStateStore::new(&cfg.peer_addr, cfg.peer_https, cfg.peer_timeout())?;
            tracing::info!("Slave peer: {}", cfg.peer_addr);
            Some(Orchestrator::new(local.clone(), Arc::new(slave), runner.clone(), cfg.pacing()))
        }
        Role::Slave => None,
    };

    let htpasswd = match (cfg.role, cfg.htpasswd_file.is_empty()) {
        (Role::Master, false) => Some(Htpasswd::load(&cfg.htpasswd_file).await?),
        _ => None,
    };

    // Create app state
    let state = Arc::new(AppState {
        config: cfg.clone(),
        local,
        orchestrator,
        htpasswd,
    });

    // Build router
    let app = router::build(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&cfg.listen_addr).await?;
    tracing::info!("LVSNetwork API listening on {}", cfg.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("LVSNetwork API shutting down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => { sig.recv().await; }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
