//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid note id: {0}")]
    InvalidNoteId(String),

    #[error("invalid user id: {0}")]
    InvalidUserId(String),

    #[error("note has no content: text, image or voice is required")]
    EmptyNote,

    #[error("invalid media: {0}")]
    InvalidMedia(String),

    #[error("image too large: {size} bytes (max {max})")]
    ImageTooLarge { size: usize, max: usize },

    #[error("invalid inline payload: {0}")]
    InlinePayload(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
