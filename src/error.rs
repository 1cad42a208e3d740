//! Error types for the ledger reconciler

use thiserror::Error;

/// Result type alias for reconciler operations
pub type Result<T> = std::result::Result<T, ReconcileError>;

#[derive(Error, Debug)]
pub enum ReconcileError {

    // =============================
    // Per-transaction (recoverable)
    // =============================

    #[error("Line rejected: {0}")]
    LineRejected(String),

    #[error("Amount conversion failed for token '{token}' in line: {line}")]
    AmountConversionFailed { line: String, token: String },

    #[error("Unknown transaction code: {0}")]
    UnknownTransactionCode(String),

    #[error("Unrecognized oracle response for transaction {id}: {reply}")]
    UnrecognizedOracleResponse { id: String, reply: String },

    #[error("Oracle call failed: {0}")]
    OracleCallFailure(String),

    #[error("Oracle call timed out after {0} ms")]
    OracleTimeout(u64),

    // =============================
    // Run-level (fatal)
    // =============================

    #[error("Configuration error: {0}")]
    Config(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ReconcileError {
    /// Whether a failed oracle attempt is worth retrying
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ReconcileError::OracleCallFailure(_)
                | ReconcileError::OracleTimeout(_)
                | ReconcileError::HttpError(_)
        )
    }
}
