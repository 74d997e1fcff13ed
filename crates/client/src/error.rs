//! Client error types.

use jotpad_docstore::DocStoreError;
use jotpad_storage::StorageError;
use thiserror::Error;

/// How an error should be treated by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected locally before any remote call.
    Validation,
    /// Remote failure the client recovers from or may retry.
    Transient,
    /// Authoritative remote failure; local state is left intact.
    Fatal,
}

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("note has no content: add text, an image or a voice recording")]
    EmptyNote,

    #[error("not signed in")]
    NotSignedIn,

    #[error(transparent)]
    Core(#[from] jotpad_core::Error),

    #[error("document store error: {0}")]
    Store(#[from] DocStoreError),

    #[error("blob storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("recorder error: {0}")]
    Recorder(String),
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyNote | Self::NotSignedIn | Self::Core(_) => ErrorKind::Validation,
            Self::Storage(_) | Self::Recorder(_) => ErrorKind::Transient,
            Self::Store(_) | Self::Auth(_) => ErrorKind::Fatal,
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyNote => "empty_note",
            Self::NotSignedIn => "not_signed_in",
            Self::Core(_) => "invalid_input",
            Self::Store(DocStoreError::NotFound(_)) => "note_not_found",
            Self::Store(_) => "store_error",
            Self::Storage(_) => "storage_error",
            Self::Auth(_) => "auth_error",
            Self::Recorder(_) => "recorder_error",
        }
    }
}

/// Result type for client operations.
pub type ClientResult<T> = std::result::Result<T, ClientError>;
