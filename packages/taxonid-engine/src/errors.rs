//! Error types for taxonid-engine
//!
//! Provides unified error handling across the crate.

use thiserror::Error;

use crate::config::ConfigError;
use taxonid_storage::StorageError;

/// Main error type for reconciliation runs
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Storage port failure, including failures while streaming usages
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A released id was claimed twice or never existed
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Current usages did not arrive ordered by canonical names index id
    #[error("Unsorted input: canonical group {next:?} arrived after {previous:?}")]
    UnsortedInput {
        previous: Option<u64>,
        next: Option<u64>,
    },

    /// Run aborted through its cancel token
    #[error("Reconciliation of project {0} cancelled")]
    Cancelled(u32),

    /// Identifier is not a valid encoded stable id
    #[error("Encoding error: {0}")]
    Encoding(String),
}

impl ReconcileError {
    pub fn invariant(msg: impl Into<String>) -> Self {
        ReconcileError::InvariantViolation(msg.into())
    }

    pub fn encoding(msg: impl Into<String>) -> Self {
        ReconcileError::Encoding(msg.into())
    }
}

/// Result type alias for reconciliation operations
pub type Result<T> = std::result::Result<T, ReconcileError>;
