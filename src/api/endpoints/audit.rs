//! Audit trail endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::core_state::AuditEntry;

#[derive(Serialize)]
pub struct AuditResponse {
    pub entries: Vec<AuditEntry>,
}

/// `GET /api/audit` — all retained audit entries, oldest first.
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<AuditResponse>, ApiError> {
    Ok(Json(AuditResponse {
        entries: ctx.core.audit_entries(),
    }))
}
