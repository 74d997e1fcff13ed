//! Database rows mapping to the notes schema.

use crate::error::{DocStoreError, DocStoreResult};
use jotpad_core::{MediaRef, Note, NoteId};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Note record. Each medium is spread over url/path/data columns; at most one
/// of url and data is set.
#[derive(Debug, Clone, FromRow)]
pub struct NoteRow {
    pub owner_uid: String,
    pub note_id: String,
    pub text: String,
    pub image_url: Option<String>,
    pub image_path: Option<String>,
    pub image_data: Option<String>,
    pub voice_url: Option<String>,
    pub voice_path: Option<String>,
    pub voice_data: Option<String>,
    pub pinned: bool,
    pub created_at: OffsetDateTime,
}

/// Column values for one medium: (url, path, data).
pub(crate) type MediaColumns<'a> = (Option<&'a str>, Option<&'a str>, Option<&'a str>);

pub(crate) fn media_columns(media: Option<&MediaRef>) -> MediaColumns<'_> {
    match media {
        Some(MediaRef::Remote { url, path }) => (Some(url), Some(path), None),
        Some(MediaRef::Inline { data_url }) => (None, None, Some(data_url)),
        None => (None, None, None),
    }
}

fn media_ref(
    note_id: &str,
    url: Option<String>,
    path: Option<String>,
    data: Option<String>,
) -> DocStoreResult<Option<MediaRef>> {
    match (url, path, data) {
        (None, None, None) => Ok(None),
        (Some(url), Some(path), None) => Ok(Some(MediaRef::Remote { url, path })),
        (None, None, Some(data_url)) => Ok(Some(MediaRef::Inline { data_url })),
        _ => Err(DocStoreError::Corrupt {
            note_id: note_id.to_string(),
            reason: "medium has conflicting url/path/data columns".to_string(),
        }),
    }
}

impl TryFrom<NoteRow> for Note {
    type Error = DocStoreError;

    fn try_from(row: NoteRow) -> DocStoreResult<Self> {
        let image = media_ref(&row.note_id, row.image_url, row.image_path, row.image_data)?;
        let voice = media_ref(&row.note_id, row.voice_url, row.voice_path, row.voice_data)?;
        let note = Note {
            id: NoteId::parse(&row.note_id)?,
            text: row.text,
            image,
            voice,
            pinned: row.pinned,
            created_at: row.created_at,
        };
        if !note.has_content() {
            return Err(DocStoreError::Corrupt {
                note_id: row.note_id,
                reason: "note has no text, image or voice".to_string(),
            });
        }
        Ok(note)
    }
}
