//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub documents: usize,
    pub version: &'static str,
}

/// `GET /api/health` — connection check.
pub async fn check(State(ctx): State<ApiContext>) -> Result<Json<HealthResponse>, ApiError> {
    let documents = ctx.core.read_documents()?.len();

    Ok(Json(HealthResponse {
        status: "ok",
        documents,
        version: crate::config::APP_VERSION,
    }))
}
