//! Liveness endpoint for hosting platforms that expect an open port
//!
//! `GET /` and `GET /health` both answer with a fixed plain-text body.

use std::net::SocketAddr;

use axum::{routing::get, Router};
use tokio::net::TcpListener;

pub const LIVENESS_BODY: &str = "Velto bot is running";

pub fn router() -> Router {
    Router::new()
        .route("/", get(liveness_handler))
        .route("/health", get(liveness_handler))
}

async fn liveness_handler() -> &'static str {
    LIVENESS_BODY
}

/// Binds `0.0.0.0:port` and serves until the process exits.
pub async fn start_health_server(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting liveness server on http://{}", addr);
    serve(listener).await
}

async fn serve(listener: TcpListener) -> anyhow::Result<()> {
    axum::serve(listener, router()).await?;
    Ok(())
}
