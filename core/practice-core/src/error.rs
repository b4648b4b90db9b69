//! Error types for practice-core operations.
//! Every variant is recoverable: the engine stays in a well-defined state.

use std::path::PathBuf;

/// All errors that can occur in practice-core operations.
#[derive(Debug, thiserror::Error)]
pub enum PracticeError {
    // ─────────────────────────────────────────────────────────────────────
    // Session Lifecycle Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("A practice session is already running")]
    AlreadyActive,

    #[error("No practice session is running")]
    NotActive,

    #[error("No active session to finalize")]
    NoActiveSession,

    #[error("Session is not in the classification phase")]
    NotClassifying,

    #[error("An interrupted session must be resumed or discarded first")]
    RecoveryPending,

    #[error("No interrupted session to recover")]
    NoRecoveryPending,

    // ─────────────────────────────────────────────────────────────────────
    // Data Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Practice item not found: {0}")]
    ItemNotFound(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Practice item text is empty")]
    EmptyItemText,

    #[error("Invalid import file: {reason}")]
    InvalidImportEnvelope { reason: String },

    #[error("Stored practice data is corrupt: {path}: {details}")]
    CorruptDurableState { path: PathBuf, details: String },

    // ─────────────────────────────────────────────────────────────────────
    // I/O Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results using PracticeError.
pub type Result<T> = std::result::Result<T, PracticeError>;
