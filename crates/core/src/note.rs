//! Note documents and their identifiers.

use crate::media::MediaKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;
use uuid::Uuid;

/// Maximum length of a note identifier.
const MAX_NOTE_ID_LEN: usize = 128;

/// Identifier of a note, unique within its owner's collection.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NoteId(String);

impl NoteId {
    /// Generate a new random note ID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Parse from a string.
    ///
    /// Note IDs become blob path components, so only `[A-Za-z0-9_-]` is accepted.
    pub fn parse(s: &str) -> crate::Result<Self> {
        if s.is_empty() || s.len() > MAX_NOTE_ID_LEN {
            return Err(crate::Error::InvalidNoteId(format!(
                "length must be between 1 and {MAX_NOTE_ID_LEN}: {s:?}"
            )));
        }
        if !s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(crate::Error::InvalidNoteId(format!(
                "contains invalid characters: {s:?}"
            )));
        }
        Ok(Self(s.to_string()))
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for NoteId {
    type Error = crate::Error;

    fn try_from(value: String) -> crate::Result<Self> {
        Self::parse(&value)
    }
}

impl From<NoteId> for String {
    fn from(id: NoteId) -> Self {
        id.0
    }
}

impl fmt::Debug for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NoteId({})", self.0)
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of an authenticated user.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Parse from a string.
    pub fn parse(s: &str) -> crate::Result<Self> {
        if s.trim().is_empty() {
            return Err(crate::Error::InvalidUserId("empty user id".to_string()));
        }
        if s.contains('/') || s.contains('\\') || s.contains("..") {
            return Err(crate::Error::InvalidUserId(format!(
                "path separators not allowed: {s:?}"
            )));
        }
        Ok(Self(s.to_string()))
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = crate::Error;

    fn try_from(value: String) -> crate::Result<Self> {
        Self::parse(&value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a note's image or voice payload lives.
///
/// Chosen once at upload time: a durable blob with its retrievable URL, or the
/// payload embedded in the document as a data URL when the upload failed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MediaRef {
    /// Uploaded to the blob store.
    Remote {
        /// Retrievable URL returned by the blob store.
        url: String,
        /// Blob store path the object was written to.
        path: String,
    },
    /// Embedded in the note document.
    Inline {
        /// `data:<mime>;base64,<payload>` URL.
        data_url: String,
    },
}

impl MediaRef {
    /// Source usable by a renderer (URL or data URL).
    pub fn src(&self) -> &str {
        match self {
            Self::Remote { url, .. } => url,
            Self::Inline { data_url } => data_url,
        }
    }

    /// Blob store path, if the payload lives in the blob store.
    pub fn blob_path(&self) -> Option<&str> {
        match self {
            Self::Remote { path, .. } => Some(path),
            Self::Inline { .. } => None,
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, Self::Inline { .. })
    }
}

/// A note as stored in the document store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    /// Note text, empty when the note only carries media.
    pub text: String,
    pub image: Option<MediaRef>,
    pub voice: Option<MediaRef>,
    pub pinned: bool,
    /// Assigned by the document store when the note is written.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Note {
    /// Check the at-least-one-field invariant.
    pub fn has_content(&self) -> bool {
        !self.text.is_empty() || self.image.is_some() || self.voice.is_some()
    }

    /// Media reference for the given kind.
    pub fn media(&self, kind: MediaKind) -> Option<&MediaRef> {
        match kind {
            MediaKind::Image => self.image.as_ref(),
            MediaKind::Voice => self.voice.as_ref(),
        }
    }

    /// Blob store paths owned by this note, one per remote medium.
    pub fn blob_paths(&self) -> Vec<(MediaKind, &str)> {
        [MediaKind::Image, MediaKind::Voice]
            .into_iter()
            .filter_map(|kind| {
                self.media(kind)
                    .and_then(MediaRef::blob_path)
                    .map(|path| (kind, path))
            })
            .collect()
    }

    /// Content type labels ("text", "image", "voice") present on the note.
    pub fn content_types(&self) -> Vec<&'static str> {
        let mut types = Vec::with_capacity(3);
        if !self.text.is_empty() {
            types.push("text");
        }
        if self.image.is_some() {
            types.push("image");
        }
        if self.voice.is_some() {
            types.push("voice");
        }
        types
    }
}

/// Complete note content for a single document write.
///
/// The creation timestamp is not part of the write; the store assigns it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoteWrite {
    pub id: NoteId,
    pub text: String,
    pub image: Option<MediaRef>,
    pub voice: Option<MediaRef>,
    pub pinned: bool,
}

impl NoteWrite {
    /// Create an unpinned note write, enforcing the at-least-one-field invariant.
    pub fn new(
        id: NoteId,
        text: impl Into<String>,
        image: Option<MediaRef>,
        voice: Option<MediaRef>,
    ) -> crate::Result<Self> {
        let text = text.into();
        if text.is_empty() && image.is_none() && voice.is_none() {
            return Err(crate::Error::EmptyNote);
        }
        Ok(Self {
            id,
            text,
            image,
            voice,
            pinned: false,
        })
    }

    /// Materialize the stored note with the store-assigned timestamp.
    pub fn into_note(self, created_at: OffsetDateTime) -> Note {
        Note {
            id: self.id,
            text: self.text,
            image: self.image,
            voice: self.voice,
            pinned: self.pinned,
            created_at,
        }
    }
}

/// Partial update merged into an existing note; `None` fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub pinned: Option<bool>,
}

impl NotePatch {
    pub fn pinned(pinned: bool) -> Self {
        Self {
            pinned: Some(pinned),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pinned.is_none()
    }
}
