//! Router construction and the server entry point.

use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    config::ServerConfig,
    error::ServerError,
    ui::{
        handler::{health_check, websocket_handler},
        reaper::spawn_reaper,
        signal::shutdown_signal,
        state::AppState,
    },
};

/// Build the application router.
pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(websocket_handler))
        .route("/api/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind, start the reaper and serve until a shutdown signal arrives.
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let address = config.bind_address();
    let state = Arc::new(AppState::new(config)?);

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;

    let reaper = spawn_reaper(
        state.repository.clone(),
        state.config.expiry_policy(),
        state.config.reap_interval(),
    );

    tracing::info!("Listening on {}", address);
    let result = axum::serve(listener, build_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    reaper.abort();
    result.map_err(ServerError::from)
}
