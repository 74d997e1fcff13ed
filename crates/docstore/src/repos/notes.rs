//! Note repository trait for a per-user note collection.

use crate::error::DocStoreResult;
use async_trait::async_trait;
use jotpad_core::{Note, NoteId, NotePatch, NoteWrite, UserId};

/// Repository for notes, scoped by owner.
#[async_trait]
pub trait NoteRepo: Send + Sync {
    /// Allocate a fresh note identifier without writing anything.
    fn generate_id(&self) -> NoteId;

    /// Write a complete note in one operation, replacing any existing document
    /// with the same id. The store assigns `created_at`.
    async fn set_note(&self, owner: &UserId, note: NoteWrite) -> DocStoreResult<Note>;

    /// Merge a partial update into an existing note.
    ///
    /// Returns `NotFound` when the note does not exist.
    async fn merge_note(&self, owner: &UserId, id: &NoteId, patch: NotePatch)
    -> DocStoreResult<Note>;

    /// Delete a note document. Deleting a missing note succeeds.
    async fn delete_note(&self, owner: &UserId, id: &NoteId) -> DocStoreResult<()>;

    /// Get a single note.
    async fn get_note(&self, owner: &UserId, id: &NoteId) -> DocStoreResult<Option<Note>>;

    /// Full snapshot of an owner's collection, unordered.
    async fn list_notes(&self, owner: &UserId) -> DocStoreResult<Vec<Note>>;
}
