//! Audit logging middleware.
//!
//! Logs every API request with operator role, method, path, and
//! response status. Runs innermost, after auth has injected
//! `OperatorContext`.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::types::{ApiContext, OperatorContext};
use crate::core_state::AccessSource;

/// Log API access for the audit trail.
/// Accesses `ApiContext` from request extensions.
pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let ctx = req.extensions().get::<ApiContext>().cloned();
    let source = req
        .extensions()
        .get::<OperatorContext>()
        .map(|op| AccessSource::Operator { role: op.role })
        .unwrap_or(AccessSource::System);

    let response = next.run(req).await;

    if let Some(ctx) = ctx {
        let status = response.status().as_u16();
        ctx.core.log_access(
            source,
            &format!("{method} {path}"),
            &format!("status:{status}"),
        );
    }

    response
}
