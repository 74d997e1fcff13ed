//! Staged media drafts, blob path conventions and inline payload encoding.

use crate::note::{NoteId, UserId};
use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two media slots a note can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Voice,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Voice => "voice",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Blob path for a note image: `users/{uid}/images/{noteId}.{ext}`.
pub fn image_path(owner: &UserId, note: &NoteId, ext: &str) -> String {
    format!("users/{owner}/images/{note}.{ext}")
}

/// Blob path for a voice note: `users/{uid}/voice/{noteId}.webm`.
pub fn voice_path(owner: &UserId, note: &NoteId) -> String {
    format!("users/{owner}/voice/{note}.webm")
}

/// Encode a payload as a self-contained `data:` URL.
pub fn encode_inline(content_type: &str, data: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        content_type,
        general_purpose::STANDARD.encode(data)
    )
}

/// Decode a `data:<mime>;base64,<payload>` URL into its content type and bytes.
pub fn decode_inline(data_url: &str) -> crate::Result<(String, Bytes)> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| crate::Error::InlinePayload("missing data: scheme".to_string()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| crate::Error::InlinePayload("missing payload separator".to_string()))?;
    let content_type = meta
        .strip_suffix(";base64")
        .ok_or_else(|| crate::Error::InlinePayload("payload is not base64".to_string()))?;
    let data = general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| crate::Error::InlinePayload(format!("invalid base64: {e}")))?;
    Ok((content_type.to_string(), Bytes::from(data)))
}

/// An image selected by the user, not yet committed to a note.
#[derive(Clone, PartialEq, Eq)]
pub struct StagedImage {
    data: Bytes,
    file_name: String,
    content_type: String,
}

impl StagedImage {
    /// Stage an image, rejecting non-image content and payloads over `max_bytes`.
    pub fn new(
        data: Bytes,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        max_bytes: usize,
    ) -> crate::Result<Self> {
        let content_type = content_type.into();
        if !content_type.starts_with("image/") {
            return Err(crate::Error::InvalidMedia(format!(
                "not an image: {content_type}"
            )));
        }
        if data.is_empty() {
            return Err(crate::Error::InvalidMedia("image is empty".to_string()));
        }
        if data.len() > max_bytes {
            return Err(crate::Error::ImageTooLarge {
                size: data.len(),
                max: max_bytes,
            });
        }
        Ok(Self {
            data,
            file_name: file_name.into(),
            content_type,
        })
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// File extension for the blob path.
    ///
    /// Taken from the file name, falling back to the content-type subtype.
    pub fn extension(&self) -> String {
        let from_name = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| is_safe_extension(ext));
        let from_type = self
            .content_type
            .split_once('/')
            .map(|(_, sub)| sub.split(['+', ';']).next().unwrap_or(sub))
            .filter(|ext| is_safe_extension(ext));
        from_name
            .or(from_type)
            .unwrap_or("bin")
            .to_ascii_lowercase()
    }
}

impl fmt::Debug for StagedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StagedImage")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.data.len())
            .finish()
    }
}

fn is_safe_extension(ext: &str) -> bool {
    !ext.is_empty() && ext.len() <= 10 && ext.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// A finished voice recording, not yet committed to a note.
#[derive(Clone, PartialEq, Eq)]
pub struct StagedVoice {
    data: Bytes,
}

impl StagedVoice {
    pub fn new(data: Bytes) -> crate::Result<Self> {
        if data.is_empty() {
            return Err(crate::Error::InvalidMedia(
                "recording produced no audio".to_string(),
            ));
        }
        Ok(Self { data })
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn content_type(&self) -> &'static str {
        crate::VOICE_CONTENT_TYPE
    }
}

impl fmt::Debug for StagedVoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StagedVoice")
            .field("size", &self.data.len())
            .finish()
    }
}

/// Media staged for the next note. Never persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MediaDraft {
    pub image: Option<StagedImage>,
    pub voice: Option<StagedVoice>,
}

impl MediaDraft {
    pub fn is_empty(&self) -> bool {
        self.image.is_none() && self.voice.is_none()
    }

    pub fn clear(&mut self) {
        self.image = None;
        self.voice = None;
    }
}
