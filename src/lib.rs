//! Parapheur — a government signing desk.
//!
//! Documents are uploaded, annotated with model-extracted metadata and
//! a compliance status, routed for signature, stamped with the CFO's
//! signature image, and archived to a (simulated) records repository.

pub mod api;
pub mod archive;
pub mod compliance;
pub mod config;
pub mod core_state;
pub mod datauri;
pub mod models;
pub mod pipeline;
pub mod signing;
pub mod store;
pub mod workflow;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

/// Initialize logging, build the shared state, and serve the API.
pub async fn run() -> Result<(), api::server::ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let core = Arc::new(core_state::CoreState::new());
    api::serve(core).await
}
