//! Router error types.

use crate::lifecycle::WorkerState;
use jotpad_storage::StorageError;
use thiserror::Error;

/// Router errors.
///
/// These surface from lifecycle operations and from the fetcher. Request
/// interception never returns them; it resolves to a fallback instead.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("network unreachable: {0}")]
    Unreachable(String),

    #[error("unexpected status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("cache storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("corrupt cache entry {key}: {reason}")]
    CorruptEntry { key: String, reason: String },

    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid lifecycle transition: {from} -> {to}")]
    InvalidState { from: WorkerState, to: WorkerState },

    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for router operations.
pub type RouterResult<T> = std::result::Result<T, RouterError>;
