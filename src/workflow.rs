//! Document workflow state machine.
//!
//! States run one way: `Uploaded → Shared → Signed`. Signed is terminal.
//! Each transition is triggered by an explicit operator action and checked
//! against the operator's role. A failed transition leaves the document
//! untouched; the caller surfaces the error.

use crate::models::{Document, Role, WorkflowState};

/// Errors from workflow transitions.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Role '{role}' may not {action} documents")]
    Forbidden { role: Role, action: &'static str },
    #[error("Document must be shared for signature before signing")]
    NotShared,
    #[error("Document is already signed")]
    AlreadySigned,
    #[error("Document must be signed before archival")]
    NotSigned,
}

/// Record a share action. `Uploaded → Shared`; sharing an already-shared
/// document replays the action (idempotent by replacement) but a signed
/// document is closed to further routing.
pub fn share(doc: &mut Document, role: Role) -> Result<WorkflowState, WorkflowError> {
    if !role.can_share() {
        return Err(WorkflowError::Forbidden {
            role,
            action: "share",
        });
    }
    if doc.is_signed {
        return Err(WorkflowError::AlreadySigned);
    }
    doc.is_shared_for_signature = true;
    doc.shared_at = Some(chrono::Utc::now());
    debug_assert!(doc.invariant_holds());
    Ok(doc.workflow_state())
}

/// Check that a sign action is admissible. Does not mutate: the caller
/// performs the (fallible) stamping first and commits via [`commit_sign`]
/// only on success, so a failed attempt leaves state unchanged.
pub fn authorize_sign(doc: &Document, role: Role) -> Result<(), WorkflowError> {
    if !role.can_sign() {
        return Err(WorkflowError::Forbidden {
            role,
            action: "sign",
        });
    }
    if doc.is_signed {
        return Err(WorkflowError::AlreadySigned);
    }
    if !doc.is_shared_for_signature {
        return Err(WorkflowError::NotShared);
    }
    Ok(())
}

/// Commit a successful sign: swap in the stamped document and mark the
/// terminal state. `Shared → Signed`.
pub fn commit_sign(doc: &mut Document, signed_data_uri: String) -> WorkflowState {
    doc.document_data_uri = signed_data_uri;
    doc.is_signed = true;
    doc.signed_at = Some(chrono::Utc::now());
    debug_assert!(doc.invariant_holds());
    doc.workflow_state()
}

/// Check that an archive action is admissible (signed documents only).
pub fn authorize_archive(doc: &Document, role: Role) -> Result<(), WorkflowError> {
    if !role.can_archive() {
        return Err(WorkflowError::Forbidden {
            role,
            action: "archive",
        });
    }
    if !doc.is_signed {
        return Err(WorkflowError::NotSigned);
    }
    Ok(())
}
