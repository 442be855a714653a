pub mod document;
pub mod enums;
pub mod filters;

pub use document::Document;
pub use enums::{ComplianceStatus, Role, WorkflowState};
pub use filters::{FilterCondition, FilterField, FilterRule};

/// Errors from model parsing.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Invalid value '{value}' for {field}")]
    InvalidEnum { field: String, value: String },
}
