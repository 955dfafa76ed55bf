//! HTTP server for voiceeased

use crate::config::Config;
use crate::routes;
use crate::sessions::SessionStore;
use crate::store::Store;
use anyhow::{Context, Result};
use axum::Router;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

/// How often expired sessions are swept
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Application state shared across handlers
pub struct AppState {
    pub store: Store,
    pub sessions: SessionStore,
    pub config: Config,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: Store, config: Config) -> Self {
        let sessions = SessionStore::new(
            config.auth.session_capacity,
            Duration::from_secs(config.auth.session_ttl_secs),
        );
        Self {
            store,
            sessions,
            config,
            start_time: Instant::now(),
        }
    }
}

/// Build the full router
pub fn router(state: Arc<AppState>) -> Router {
    let max_body = state.config.server.max_body_bytes;

    Router::new()
        .merge(routes::auth_routes())
        .merge(routes::agent_request_routes())
        .merge(routes::marketing_routes())
        .merge(routes::admin_routes())
        .merge(routes::health_routes())
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(max_body))
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server until Ctrl-C
pub async fn run(state: AppState) -> Result<()> {
    let state = Arc::new(state);
    let addr = state.config.server.bind.clone();

    let sessions = state.sessions.clone();
    let sweeper = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            let pruned = sessions.prune_expired().await;
            if pruned > 0 {
                debug!("Pruned {} expired sessions", pruned);
            }
        }
    });

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("  Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    info!("Shutting down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
