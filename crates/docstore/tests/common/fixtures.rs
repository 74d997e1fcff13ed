use jotpad_core::{MediaRef, NoteId, NoteWrite, UserId};
use jotpad_docstore::SqliteStore;

#[allow(dead_code)]
pub async fn store() -> SqliteStore {
    SqliteStore::in_memory().await.unwrap()
}

#[allow(dead_code)]
pub fn owner(uid: &str) -> UserId {
    UserId::parse(uid).unwrap()
}

#[allow(dead_code)]
pub fn text_write(id: &NoteId, text: &str) -> NoteWrite {
    NoteWrite::new(id.clone(), text, None, None).unwrap()
}

/// An image-only note whose image was uploaded to the blob store.
#[allow(dead_code)]
pub fn image_write(owner: &UserId, id: &NoteId) -> NoteWrite {
    let path = jotpad_core::media::image_path(owner, id, "png");
    let image = MediaRef::Remote {
        url: format!("https://media.test/{path}"),
        path,
    };
    NoteWrite::new(id.clone(), "", Some(image), None).unwrap()
}
