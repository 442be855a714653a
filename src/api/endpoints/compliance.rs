//! Fleet compliance report endpoint.

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::compliance;

#[derive(Serialize)]
pub struct ReportResponse {
    /// Markdown report text.
    pub report: String,
    pub document_count: usize,
    pub generated_at: DateTime<Utc>,
}

/// `GET /api/compliance/report` — generate the fleet-wide Markdown
/// compliance report over every document.
pub async fn report(State(ctx): State<ApiContext>) -> Result<Json<ReportResponse>, ApiError> {
    let documents = ctx.core.read_documents()?.list(None);
    let document_count = documents.len();

    let llm = ctx.core.llm();
    let report = tokio::task::spawn_blocking(move || {
        if documents.is_empty() {
            // No model call for an empty fleet.
            return compliance::fleet_report(llm.as_ref(), "", &documents);
        }
        let model = llm.resolve_model()?;
        compliance::fleet_report(llm.as_ref(), &model, &documents)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("report task: {e}")))??;

    Ok(Json(ReportResponse {
        report,
        document_count,
        generated_at: Utc::now(),
    }))
}
