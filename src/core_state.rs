//! Transport-agnostic application state.
//!
//! `CoreState` is the single shared state behind the REST API. Wrapped
//! in `Arc` at startup. Uses `RwLock` around the document store for
//! concurrent read access from multiple handlers.

use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;

use crate::archive::ArchiveClient;
use crate::models::Role;
use crate::pipeline::ollama::{LlmClient, OllamaClient};
use crate::store::DocumentStore;

/// Maximum retained audit entries. Oldest entries are dropped first.
const AUDIT_CAPACITY: usize = 1000;

// ═══════════════════════════════════════════════════════════
// CoreState — shared by every API handler
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    /// All documents, keyed by id. In-memory only; the process is the
    /// system of record for this demo deployment.
    documents: RwLock<DocumentStore>,
    /// Audit log for all data access events.
    audit: AuditLogger,
    /// Language model access for extraction and reporting.
    llm: Arc<dyn LlmClient>,
    /// Simulated records repository + compliance ledger.
    archive: ArchiveClient,
}

impl CoreState {
    /// Production wiring: Ollama from the environment, simulated
    /// archival latency.
    pub fn new() -> Self {
        Self::with_backends(Arc::new(OllamaClient::from_env()), ArchiveClient::simulated())
    }

    /// Explicit wiring, used by tests to inject a mock model and an
    /// instant archive client.
    pub fn with_backends(llm: Arc<dyn LlmClient>, archive: ArchiveClient) -> Self {
        Self {
            documents: RwLock::new(DocumentStore::new()),
            audit: AuditLogger::new(),
            llm,
            archive,
        }
    }

    // ── Document store access ───────────────────────────────

    pub fn read_documents(&self) -> Result<RwLockReadGuard<'_, DocumentStore>, CoreError> {
        self.documents.read().map_err(|_| CoreError::LockPoisoned)
    }

    pub fn write_documents(&self) -> Result<RwLockWriteGuard<'_, DocumentStore>, CoreError> {
        self.documents.write().map_err(|_| CoreError::LockPoisoned)
    }

    // ── Backends ────────────────────────────────────────────

    pub fn llm(&self) -> Arc<dyn LlmClient> {
        Arc::clone(&self.llm)
    }

    pub fn archive(&self) -> &ArchiveClient {
        &self.archive
    }

    // ── Audit log ───────────────────────────────────────────

    /// Log a data access event.
    pub fn log_access(&self, source: AccessSource, action: &str, entity: &str) {
        self.audit.log(source, action, entity);
    }

    /// All retained audit entries, oldest first.
    pub fn audit_entries(&self) -> Vec<AuditEntry> {
        self.audit.entries()
    }
}

impl Default for CoreState {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════
// Error types
// ═══════════════════════════════════════════════════════════

/// Errors from CoreState operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Internal lock error")]
    LockPoisoned,
}

// ═══════════════════════════════════════════════════════════
// Access source tracking
// ═══════════════════════════════════════════════════════════

/// Identifies the source of a data access for audit logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum AccessSource {
    /// An authenticated operator acting through the REST API.
    Operator { role: Role },
    /// Internal activity not attributable to an operator.
    System,
}

impl std::fmt::Display for AccessSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Operator { role } => write!(f, "operator:{role}"),
            Self::System => write!(f, "system"),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Audit logger
// ═══════════════════════════════════════════════════════════

/// In-memory audit log. Capacity-bounded; when full, the oldest entry
/// is dropped to admit the newest.
pub struct AuditLogger {
    buffer: Mutex<Vec<AuditEntry>>,
}

/// A single audit log entry.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub source: AccessSource,
    pub action: String,
    pub entity: String,
}

impl AuditLogger {
    pub fn new() -> Self {
        Self {
            buffer: Mutex::new(Vec::new()),
        }
    }

    pub fn log(&self, source: AccessSource, action: &str, entity: &str) {
        if let Ok(mut buf) = self.buffer.lock() {
            if buf.len() >= AUDIT_CAPACITY {
                buf.remove(0);
            }
            buf.push(AuditEntry {
                timestamp: chrono::Utc::now(),
                source,
                action: action.to_string(),
                entity: entity.to_string(),
            });
        }
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.buffer
            .lock()
            .map(|buf| buf.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.buffer.lock().map(|buf| buf.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audit_log_records_entries_in_order() {
        let logger = AuditLogger::new();
        logger.log(AccessSource::System, "upload", "doc:1");
        logger.log(
            AccessSource::Operator {
                role: Role::Cfo,
            },
            "sign",
            "doc:1",
        );

        let entries = logger.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, "upload");
        assert_eq!(entries[1].source, AccessSource::Operator { role: Role::Cfo });
    }

    #[test]
    fn audit_log_drops_oldest_at_capacity() {
        let logger = AuditLogger::new();
        for i in 0..AUDIT_CAPACITY + 5 {
            logger.log(AccessSource::System, &format!("action_{i}"), "x");
        }
        let entries = logger.entries();
        assert_eq!(entries.len(), AUDIT_CAPACITY);
        assert_eq!(entries[0].action, "action_5");
    }

    #[test]
    fn access_source_display() {
        let op = AccessSource::Operator {
            role: Role::FinanceManager,
        };
        assert_eq!(op.to_string(), "operator:finance_manager");
        assert_eq!(AccessSource::System.to_string(), "system");
    }

    #[test]
    fn core_state_document_store_round_trip() {
        use crate::archive::ArchiveClient;
        use crate::pipeline::ollama::MockLlmClient;

        let state = CoreState::with_backends(
            Arc::new(MockLlmClient::new("unused")),
            ArchiveClient::instant(),
        );
        assert_eq!(state.read_documents().unwrap().len(), 0);
    }
}
