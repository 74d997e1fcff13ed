//! User actions and their outcomes.

use crate::auth::User;
use bytes::Bytes;
use jotpad_core::{Note, NoteId};

/// Every user action the client handles.
#[derive(Clone, Debug)]
pub enum Command {
    SignIn,
    SignOut,
    SetText(String),
    StageImage {
        data: Bytes,
        file_name: String,
        content_type: String,
    },
    RemoveImage,
    RemoveVoice,
    ClearMedia,
    ToggleRecording,
    AddNote,
    DeleteNote(NoteId),
    TogglePin(NoteId, bool),
    ClearAll { confirmed: bool },
    Search(String),
}

/// Result of a dispatched command.
#[derive(Debug)]
pub enum Outcome {
    /// Local state updated; nothing else to report.
    Done,
    SignedIn(User),
    SignedOut,
    RecordingStarted,
    VoiceStaged,
    /// The command had no effect.
    Ignored,
    NoteAdded(Note),
    NoteDeleted(NoteId),
    NoteUpdated(Note),
    Cleared(ClearReport),
    /// A confirmation-gated command was not confirmed.
    Cancelled,
    /// Search results, in view order.
    Filtered(Vec<Note>),
}

/// Per-note results of a bulk clear. Successful deletions are not rolled back.
#[derive(Debug, Default)]
pub struct ClearReport {
    pub deleted: usize,
    pub failed: Vec<(NoteId, String)>,
}

impl ClearReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}
