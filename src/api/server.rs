//! HTTP server bootstrap.

use std::sync::Arc;

use axum::http::{header, HeaderValue};
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::api_router;
use crate::config;
use crate::core_state::CoreState;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Bind the configured address and serve the API until shutdown.
///
/// CORS is permissive: the demo front-end runs on a separate dev
/// origin. Responses carry `Cache-Control: no-store` since document
/// payloads move through every endpoint.
pub async fn serve(core: Arc<CoreState>) -> Result<(), ServerError> {
    let addr = config::bind_addr();

    let router = api_router(core)
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    tracing::info!(%addr, "API server listening");

    axum::serve(listener, router).await?;
    Ok(())
}
