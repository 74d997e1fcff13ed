//! Document store error types.

use thiserror::Error;

/// Document store operation errors.
#[derive(Debug, Error)]
pub enum DocStoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    /// A stored row violates the note invariants.
    #[error("corrupt document {note_id}: {reason}")]
    Corrupt { note_id: String, reason: String },

    #[error(transparent)]
    Core(#[from] jotpad_core::Error),
}

impl DocStoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type for document store operations.
pub type DocStoreResult<T> = std::result::Result<T, DocStoreError>;
