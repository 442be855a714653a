//! Shared types for the API layer.

use std::sync::Arc;

use crate::core_state::CoreState;
use crate::models::Role;

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

/// Authenticated operator, injected into request extensions by the
/// auth middleware after the role header has been validated.
#[derive(Debug, Clone, Copy)]
pub struct OperatorContext {
    pub role: Role,
}
