use super::mocks::{FlakyBlobStore, FlakyDocStore, ScriptedMic};
use jotpad_client::{LocalAuth, NoteClient, User};
use jotpad_core::config::ClientConfig;
use jotpad_core::{Note, UserId};
use std::sync::Arc;
use std::time::Duration;

/// Smallest PNG-looking payload the client accepts.
#[allow(dead_code)]
pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n";

#[allow(dead_code)]
pub struct Harness {
    pub client: Arc<NoteClient>,
    pub auth: Arc<LocalAuth>,
    pub docs: Arc<FlakyDocStore>,
    pub blobs: Arc<FlakyBlobStore>,
    pub mic: Arc<ScriptedMic>,
}

#[allow(dead_code)]
impl Harness {
    pub async fn new() -> Self {
        Self::with(ClientConfig::default(), ScriptedMic::new(&[b"\x1a\x45", b"\xdf\xa3"])).await
    }

    pub async fn with(config: ClientConfig, mic: ScriptedMic) -> Self {
        let auth = Arc::new(LocalAuth::new(user("u1")));
        let docs = Arc::new(FlakyDocStore::new().await);
        let blobs = Arc::new(FlakyBlobStore::new());
        let mic = Arc::new(mic);
        let client = Arc::new(NoteClient::new(
            auth.clone(),
            docs.clone(),
            blobs.clone(),
            mic.clone(),
            config,
        ));
        Self {
            client,
            auth,
            docs,
            blobs,
            mic,
        }
    }

    pub async fn signed_in() -> Self {
        let harness = Self::new().await;
        harness.client.sign_in().await.unwrap();
        harness
    }

    /// Add a text-only note through the client.
    pub async fn add_text(&self, text: &str) -> Note {
        self.client.set_text(text).await;
        self.client.add_note().await.unwrap()
    }
}

#[allow(dead_code)]
pub fn user(uid: &str) -> User {
    User::new(UserId::parse(uid).unwrap(), format!("User {uid}"))
}

/// Wait until the client's view satisfies `pred`.
#[allow(dead_code)]
pub async fn wait_for_view(client: &NoteClient, pred: impl FnMut(&Arc<Vec<Note>>) -> bool) {
    let mut rx = client.subscribe_view();
    tokio::time::timeout(Duration::from_secs(2), rx.wait_for(pred))
        .await
        .expect("view did not reach expected state")
        .expect("view channel closed");
}
