//! Operator role authentication middleware.
//!
//! Extracts `X-Operator-Role`, validates it against the known roles,
//! and injects `OperatorContext` into request extensions for downstream
//! handlers. This is demo-grade identification, not real authentication;
//! the header names which seat at the signing desk is acting.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::OperatorContext;
use crate::models::Role;

pub const ROLE_HEADER: &str = "X-Operator-Role";

/// Require a valid operator role header on every request.
pub async fn require_role(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_role_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_role_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let role: Role = req
        .headers()
        .get(ROLE_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .ok_or(ApiError::Unauthorized)?;

    req.extensions_mut().insert(OperatorContext { role });
    Ok(next.run(req).await)
}
