//! Core domain types and shared logic for jotpad.
//!
//! This crate defines the canonical data model used across all other crates:
//! - Note documents, user and note identifiers
//! - Media references (remote blob or inline payload) and staged media drafts
//! - Local view ordering and search filtering
//! - Application configuration

pub mod config;
pub mod error;
pub mod media;
pub mod note;
pub mod view;

pub use error::{Error, Result};
pub use media::{MediaDraft, MediaKind, StagedImage, StagedVoice};
pub use note::{MediaRef, Note, NoteId, NotePatch, NoteWrite, UserId};
pub use view::{build_view, filter_notes, sort_notes};

/// Maximum size of a staged image: 10 MiB
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Content type of recorded voice notes.
pub const VOICE_CONTENT_TYPE: &str = "audio/webm";
