//! Document endpoints: upload, listing, detail, and the workflow
//! actions (share, sign, archive).

use axum::extract::{Path, Query, State};
use axum::Extension;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, OperatorContext};
use crate::archive::{ArchiveMetadata, ArchiveReceipt, ArchiveRecord};
use crate::models::{Document, FilterCondition, FilterField, FilterRule, WorkflowState};
use crate::pipeline::intake::intake_document;
use crate::signing;
use crate::store::DocumentStats;
use crate::workflow;

/// A document as returned to clients: the record plus derived fields.
#[derive(Serialize)]
pub struct DocumentResponse {
    #[serde(flatten)]
    pub document: Document,
    pub workflow_state: WorkflowState,
    pub download_file_name: String,
}

impl From<Document> for DocumentResponse {
    fn from(document: Document) -> Self {
        let workflow_state = document.workflow_state();
        let download_file_name = document.download_file_name();
        Self {
            document,
            workflow_state,
            download_file_name,
        }
    }
}

// ── Upload ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UploadRequest {
    pub file_name: String,
    /// Base64 data URI (e.g. `data:application/pdf;base64,...`).
    pub document_data_uri: String,
}

/// `POST /api/documents/upload` — run the intake pipeline on one upload.
///
/// The model call is blocking, so the whole pipeline runs on the
/// blocking pool.
pub async fn upload(
    State(ctx): State<ApiContext>,
    Extension(_op): Extension<OperatorContext>,
    Json(payload): Json<UploadRequest>,
) -> Result<Json<DocumentResponse>, ApiError> {
    if payload.file_name.trim().is_empty() {
        return Err(ApiError::BadRequest("file_name must not be empty".into()));
    }

    let llm = ctx.core.llm();
    let doc = tokio::task::spawn_blocking(move || {
        let model = llm.resolve_model()?;
        intake_document(llm.as_ref(), &model, &payload.file_name, &payload.document_data_uri)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("intake task: {e}")))??;

    let response = DocumentResponse::from(doc.clone());
    ctx.core.write_documents()?.insert(doc);
    Ok(Json(response))
}

// ── Listing and detail ──────────────────────────────────────

#[derive(Deserialize)]
pub struct ListQuery {
    pub field: Option<FilterField>,
    pub condition: Option<FilterCondition>,
    pub value: Option<String>,
}

impl ListQuery {
    /// All three parameters or none; anything partial is an error.
    fn into_rule(self) -> Result<Option<FilterRule>, ApiError> {
        match (self.field, self.condition, self.value) {
            (Some(field), Some(condition), Some(value)) => Ok(Some(FilterRule {
                field,
                condition,
                value,
            })),
            (None, None, None) => Ok(None),
            _ => Err(ApiError::BadRequest(
                "Filter requires field, condition, and value together".into(),
            )),
        }
    }
}

/// `GET /api/documents` — list documents, optionally filtered.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<DocumentResponse>>, ApiError> {
    let rule = query.into_rule()?;
    let docs = ctx.core.read_documents()?.list(rule.as_ref());
    Ok(Json(docs.into_iter().map(DocumentResponse::from).collect()))
}

/// `GET /api/documents/stats` — aggregate workflow and compliance counts.
pub async fn stats(State(ctx): State<ApiContext>) -> Result<Json<DocumentStats>, ApiError> {
    Ok(Json(ctx.core.read_documents()?.stats()))
}

/// `GET /api/documents/:id` — single document detail.
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let doc = ctx
        .core
        .read_documents()?
        .get(id)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("Document {id} not found")))?;
    Ok(Json(doc.into()))
}

// ── Workflow actions ────────────────────────────────────────

#[derive(Default, Deserialize)]
pub struct ShareRequest {
    #[serde(default)]
    pub recipients: Vec<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST /api/documents/:id/share` — route the document for signature.
/// Recipients and message are display-only routing notes; the body is
/// optional.
pub async fn share(
    State(ctx): State<ApiContext>,
    Extension(op): Extension<OperatorContext>,
    Path(id): Path<Uuid>,
    payload: Option<Json<ShareRequest>>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let request = payload.map(|Json(r)| r).unwrap_or_default();

    let mut store = ctx.core.write_documents()?;
    store.update(id, |doc| workflow::share(doc, op.role))??;
    let doc = store
        .get(id)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("Document {id} not found")))?;

    tracing::info!(
        document_id = %id,
        role = %op.role,
        recipients = request.recipients.len(),
        "Document shared for signature"
    );
    Ok(Json(doc.into()))
}

#[derive(Deserialize)]
pub struct SignRequest {
    /// PNG signature image as a base64 data URI.
    pub signature_data_uri: String,
}

/// `POST /api/documents/:id/sign` — stamp and sign the document.
///
/// Authorization is checked before stamping and again at commit, so a
/// failed stamp never mutates the document and a concurrent transition
/// cannot be overwritten.
pub async fn sign(
    State(ctx): State<ApiContext>,
    Extension(op): Extension<OperatorContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SignRequest>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let doc = {
        ctx.core
            .read_documents()?
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("Document {id} not found")))?
    };
    workflow::authorize_sign(&doc, op.role)?;

    let source_uri = doc.document_data_uri;
    let signature_uri = payload.signature_data_uri;
    let stamped = tokio::task::spawn_blocking(move || {
        signing::sign_document_uri(&source_uri, &signature_uri, Utc::now())
    })
    .await
    .map_err(|e| ApiError::Internal(format!("signing task: {e}")))??;

    let mut store = ctx.core.write_documents()?;
    store.update(id, |doc| {
        workflow::authorize_sign(doc, op.role)?;
        Ok::<_, workflow::WorkflowError>(workflow::commit_sign(doc, stamped))
    })??;
    let doc = store
        .get(id)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("Document {id} not found")))?;

    tracing::info!(document_id = %id, role = %op.role, "Document signed");
    Ok(Json(doc.into()))
}

/// `POST /api/documents/:id/archive` — push the signed document to the
/// simulated records repository and compliance ledger.
pub async fn archive(
    State(ctx): State<ApiContext>,
    Extension(op): Extension<OperatorContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<ArchiveReceipt>, ApiError> {
    let doc = {
        ctx.core
            .read_documents()?
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("Document {id} not found")))?
    };
    workflow::authorize_archive(&doc, op.role)?;

    let record = ArchiveRecord {
        document_id: doc.id,
        file_name: doc.download_file_name(),
        signed_at: doc.signed_at,
        user: op.role.to_string(),
        metadata: ArchiveMetadata {
            title: doc.title,
            author: doc.author,
            keywords: doc.keywords,
        },
    };
    let receipt = ctx.core.archive().archive(&record).await?;
    Ok(Json(receipt))
}
