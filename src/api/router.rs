//! API router.
//!
//! Returns a composable `Router` with all endpoints nested under
//! `/api/`. Every route requires a valid `X-Operator-Role` header.
//!
//! Middleware stack (outermost → innermost):
//! 1. Extension(ApiContext) → 2. Role auth → 3. Audit logger

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the API router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost
/// layer). Endpoint handlers use `State<ApiContext>` via `with_state`.
pub fn api_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

fn build_router(ctx: ApiContext) -> Router {
    // Layers apply bottom-up: Extension (outermost) → auth → audit
    // (innermost) → handler. Extension must be outermost so both
    // middleware functions can read ApiContext from extensions.
    //
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/documents/upload", post(endpoints::documents::upload))
        .route("/documents", get(endpoints::documents::list))
        .route("/documents/stats", get(endpoints::documents::stats))
        .route("/documents/:id", get(endpoints::documents::detail))
        .route("/documents/:id/share", post(endpoints::documents::share))
        .route("/documents/:id/sign", post(endpoints::documents::sign))
        .route("/documents/:id/archive", post(endpoints::documents::archive))
        .route("/compliance/report", get(endpoints::compliance::report))
        .route("/audit", get(endpoints::audit::list))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::auth::require_role))
        .layer(axum::Extension(ctx));

    Router::new().nest("/api", routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use lopdf::{dictionary, Document as PdfDocument, Object, Stream};
    use tower::ServiceExt;

    use crate::archive::ArchiveClient;
    use crate::datauri::DataUri;
    use crate::pipeline::ollama::MockLlmClient;

    const GOOD_EXTRACTION: &str = r#"```json
{
  "title": "Annual Budget 2026",
  "author": "Provincial Treasury",
  "date_created": "2026-02-20",
  "keywords": ["budget", "fiscal"],
  "summary": "Allocation of funds across departments for FY2026."
}
```"#;

    fn test_router() -> Router {
        test_router_with_response(GOOD_EXTRACTION)
    }

    fn test_router_with_response(llm_response: &str) -> Router {
        let core = Arc::new(CoreState::with_backends(
            Arc::new(MockLlmClient::new(llm_response)),
            ArchiveClient::instant(),
        ));
        api_router(core)
    }

    fn make_test_pdf() -> Vec<u8> {
        let mut doc = PdfDocument::with_version("1.4");
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            b"BT /F1 12 Tf 100 700 Td (Budget) Tj ET".to_vec(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        });
        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        });
        if let Ok(Object::Dictionary(ref mut dict)) = doc.get_object_mut(page_id) {
            dict.set("Parent", pages_id);
        }
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    fn make_signature_png() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(40, 16, image::Rgba([10, 10, 120, 255]));
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn request(method: &str, uri: &str, role: Option<&str>, body: Option<String>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(role) = role {
            builder = builder.header("X-Operator-Role", role);
        }
        if body.is_some() {
            builder = builder.header("Content-Type", "application/json");
        }
        builder
            .body(body.map(Body::from).unwrap_or_else(Body::empty))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn upload_pdf(router: &Router, role: &str) -> serde_json::Value {
        let body = serde_json::json!({
            "file_name": "budget.pdf",
            "document_data_uri": DataUri::encode("application/pdf", &make_test_pdf()),
        });
        let response = router
            .clone()
            .oneshot(request(
                "POST",
                "/api/documents/upload",
                Some(role),
                Some(body.to_string()),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await
    }

    // ── Authentication ──────────────────────────────────────

    #[tokio::test]
    async fn missing_role_header_is_unauthorized() {
        let response = test_router()
            .oneshot(request("GET", "/api/health", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "AUTH_REQUIRED");
    }

    #[tokio::test]
    async fn unknown_role_is_unauthorized() {
        let response = test_router()
            .oneshot(request("GET", "/api/health", Some("intern"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = test_router()
            .oneshot(request("GET", "/api/health", Some("auditor"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["documents"], 0);
    }

    // ── Upload and listing ──────────────────────────────────

    #[tokio::test]
    async fn upload_returns_extracted_document() {
        let router = test_router();
        let doc = upload_pdf(&router, "finance_manager").await;

        assert_eq!(doc["title"], "Annual Budget 2026");
        assert_eq!(doc["author"], "Provincial Treasury");
        assert_eq!(doc["status"], "compliant");
        assert_eq!(doc["workflow_state"], "uploaded");
        assert_eq!(doc["download_file_name"], "budget.pdf");
    }

    #[tokio::test]
    async fn upload_rejects_bad_data_uri() {
        let body = serde_json::json!({
            "file_name": "x.pdf",
            "document_data_uri": "data:application/pdf;base64,@@not-base64@@",
        });
        let response = test_router()
            .oneshot(request(
                "POST",
                "/api/documents/upload",
                Some("finance_manager"),
                Some(body.to_string()),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn list_returns_uploaded_documents() {
        let router = test_router();
        upload_pdf(&router, "finance_manager").await;

        let response = router
            .clone()
            .oneshot(request("GET", "/api/documents", Some("auditor"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_applies_filter_query() {
        let router = test_router();
        upload_pdf(&router, "finance_manager").await;

        let hit = router
            .clone()
            .oneshot(request(
                "GET",
                "/api/documents?field=title&condition=contains&value=budget",
                Some("auditor"),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(body_json(hit).await.as_array().unwrap().len(), 1);

        let miss = router
            .clone()
            .oneshot(request(
                "GET",
                "/api/documents?field=author&condition=not-contains&value=treasury",
                Some("auditor"),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(body_json(miss).await.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn partial_filter_is_bad_request() {
        let response = test_router()
            .oneshot(request(
                "GET",
                "/api/documents?field=title",
                Some("auditor"),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn detail_of_unknown_document_is_not_found() {
        let response = test_router()
            .oneshot(request(
                "GET",
                "/api/documents/00000000-0000-0000-0000-000000000000",
                Some("auditor"),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn stats_count_workflow_stages() {
        let router = test_router();
        let doc = upload_pdf(&router, "finance_manager").await;
        let id = doc["id"].as_str().unwrap().to_string();

        router
            .clone()
            .oneshot(request(
                "POST",
                &format!("/api/documents/{id}/share"),
                Some("finance_manager"),
                None,
            ))
            .await
            .unwrap();

        let response = router
            .clone()
            .oneshot(request("GET", "/api/documents/stats", Some("auditor"), None))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["shared"], 1);
        assert_eq!(body["uploaded"], 0);
        assert_eq!(body["compliant"], 1);
    }

    // ── Workflow: share → sign → archive ────────────────────

    #[tokio::test]
    async fn full_lifecycle_share_sign_archive() {
        let router = test_router();
        let doc = upload_pdf(&router, "finance_manager").await;
        let id = doc["id"].as_str().unwrap().to_string();

        // Share as finance manager.
        let response = router
            .clone()
            .oneshot(request(
                "POST",
                &format!("/api/documents/{id}/share"),
                Some("finance_manager"),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let shared = body_json(response).await;
        assert_eq!(shared["workflow_state"], "shared");

        // Sign as CFO with a PNG signature.
        let sign_body = serde_json::json!({
            "signature_data_uri": DataUri::encode("image/png", &make_signature_png()),
        });
        let response = router
            .clone()
            .oneshot(request(
                "POST",
                &format!("/api/documents/{id}/sign"),
                Some("cfo"),
                Some(sign_body.to_string()),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let signed = body_json(response).await;
        assert_eq!(signed["workflow_state"], "signed");
        assert_eq!(signed["download_file_name"], "budget_signed.pdf");
        assert!(signed["signed_at"].is_string());

        // The stored data URI now carries the stamped PDF.
        let stamped = DataUri::parse(signed["document_data_uri"].as_str().unwrap()).unwrap();
        assert!(stamped.is_pdf());
        let reloaded = PdfDocument::load_mem(stamped.bytes()).unwrap();
        let page_id = *reloaded.get_pages().get(&1).unwrap();
        let content =
            String::from_utf8_lossy(&reloaded.get_page_content(page_id).unwrap()).to_string();
        assert!(content.contains("Verified by Parapheur"));

        // Archive as CFO.
        let response = router
            .clone()
            .oneshot(request(
                "POST",
                &format!("/api/documents/{id}/archive"),
                Some("cfo"),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let receipt = body_json(response).await;
        assert_eq!(
            receipt["repositoryUrl"],
            "https://provincial.sharepoint.com/sites/documents/signed/budget_signed.pdf"
        );
        assert!(receipt["ledgerEntryId"]
            .as_str()
            .unwrap()
            .starts_with("log_"));
    }

    #[tokio::test]
    async fn auditor_cannot_share() {
        let router = test_router();
        let doc = upload_pdf(&router, "finance_manager").await;
        let id = doc["id"].as_str().unwrap().to_string();

        let response = router
            .clone()
            .oneshot(request(
                "POST",
                &format!("/api/documents/{id}/share"),
                Some("auditor"),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn finance_manager_cannot_sign() {
        let router = test_router();
        let doc = upload_pdf(&router, "finance_manager").await;
        let id = doc["id"].as_str().unwrap().to_string();

        router
            .clone()
            .oneshot(request(
                "POST",
                &format!("/api/documents/{id}/share"),
                Some("finance_manager"),
                None,
            ))
            .await
            .unwrap();

        let sign_body = serde_json::json!({
            "signature_data_uri": DataUri::encode("image/png", &make_signature_png()),
        });
        let response = router
            .clone()
            .oneshot(request(
                "POST",
                &format!("/api/documents/{id}/sign"),
                Some("finance_manager"),
                Some(sign_body.to_string()),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn sign_before_share_is_conflict() {
        let router = test_router();
        let doc = upload_pdf(&router, "finance_manager").await;
        let id = doc["id"].as_str().unwrap().to_string();

        let sign_body = serde_json::json!({
            "signature_data_uri": DataUri::encode("image/png", &make_signature_png()),
        });
        let response = router
            .clone()
            .oneshot(request(
                "POST",
                &format!("/api/documents/{id}/sign"),
                Some("cfo"),
                Some(sign_body.to_string()),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn archive_before_sign_is_conflict() {
        let router = test_router();
        let doc = upload_pdf(&router, "finance_manager").await;
        let id = doc["id"].as_str().unwrap().to_string();

        let response = router
            .clone()
            .oneshot(request(
                "POST",
                &format!("/api/documents/{id}/archive"),
                Some("cfo"),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn failed_sign_leaves_document_shared() {
        let router = test_router();
        let doc = upload_pdf(&router, "finance_manager").await;
        let id = doc["id"].as_str().unwrap().to_string();

        router
            .clone()
            .oneshot(request(
                "POST",
                &format!("/api/documents/{id}/share"),
                Some("finance_manager"),
                None,
            ))
            .await
            .unwrap();

        // JPEG bytes labeled as PNG — stamping must refuse.
        let sign_body = serde_json::json!({
            "signature_data_uri": DataUri::encode("image/png", &[0xFF, 0xD8, 0xFF, 0xE0, 1, 2]),
        });
        let response = router
            .clone()
            .oneshot(request(
                "POST",
                &format!("/api/documents/{id}/sign"),
                Some("cfo"),
                Some(sign_body.to_string()),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = router
            .clone()
            .oneshot(request(
                "GET",
                &format!("/api/documents/{id}"),
                Some("auditor"),
                None,
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["workflow_state"], "shared");
        assert_eq!(body["is_signed"], false);
    }

    // ── Compliance report ───────────────────────────────────

    #[tokio::test]
    async fn empty_fleet_report_short_circuits() {
        let response = test_router()
            .oneshot(request("GET", "/api/compliance/report", Some("auditor"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["document_count"], 0);
        assert!(body["report"]
            .as_str()
            .unwrap()
            .contains("No documents available"));
    }

    #[tokio::test]
    async fn fleet_report_returns_model_markdown() {
        let router = test_router();
        upload_pdf(&router, "finance_manager").await;

        // The mock returns the extraction fixture for every generate
        // call; the endpoint passes it through as the report body.
        let response = router
            .clone()
            .oneshot(request("GET", "/api/compliance/report", Some("auditor"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["document_count"], 1);
        assert!(!body["report"].as_str().unwrap().is_empty());
    }

    // ── Audit trail ─────────────────────────────────────────

    #[tokio::test]
    async fn audit_trail_records_requests() {
        let router = test_router();
        upload_pdf(&router, "finance_manager").await;

        let response = router
            .clone()
            .oneshot(request("GET", "/api/audit", Some("auditor"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let entries = body["entries"].as_array().unwrap();
        assert!(!entries.is_empty());
        // Nesting strips the /api prefix before the audit layer runs.
        let action = entries[0]["action"].as_str().unwrap();
        assert!(action.starts_with("POST"));
        assert!(action.ends_with("/documents/upload"));
        assert_eq!(entries[0]["source"]["role"], "finance_manager");
    }
}
