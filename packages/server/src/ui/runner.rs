//! Router construction and server entry point.

use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::error::ServerError;

use super::{handler, signal, state::AppState};

/// Run the coordinator until a shutdown signal arrives.
pub async fn run(host: &str, port: u16) -> Result<(), ServerError> {
    let state = Arc::new(AppState::new());

    let app = Router::new()
        .route("/ws", get(handler::websocket_handler))
        .route("/api/health", get(handler::health_check))
        .route("/api/participants", get(handler::get_participants))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("{host}:{port}");
    let listener = TcpListener::bind(&addr).await.map_err(|source| ServerError::Bind {
        addr: addr.clone(),
        source,
    })?;
    tracing::info!("coordinator listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(signal::shutdown_signal())
        .await
        .map_err(ServerError::Serve)?;

    Ok(())
}
