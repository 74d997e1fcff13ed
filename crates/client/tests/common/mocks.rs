use async_trait::async_trait;
use bytes::Bytes;
use jotpad_client::{CaptureDevice, ClientError, ClientResult};
use jotpad_core::{Note, NoteId, NotePatch, NoteWrite, UserId};
use jotpad_docstore::{
    DocStoreError, DocStoreResult, DocumentStore, NoteRepo, NoteSubscription, SqliteStore,
};
use jotpad_storage::{MemoryBackend, ObjectMeta, ObjectStore, StorageError, StorageResult};
use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Notify, mpsc};

/// In-memory blob store with switchable upload and delete failures.
/// Records every delete call.
#[allow(dead_code)]
pub struct FlakyBlobStore {
    inner: MemoryBackend,
    pub fail_uploads: AtomicBool,
    pub fail_deletes: AtomicBool,
    /// When set, each put signals `put_started` and waits for `release`.
    pub hold_uploads: AtomicBool,
    pub put_started: Notify,
    pub release: Notify,
    deletes: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl FlakyBlobStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryBackend::new(Some("https://media.test".to_string())),
            fail_uploads: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
            hold_uploads: AtomicBool::new(false),
            put_started: Notify::new(),
            release: Notify::new(),
            deletes: Mutex::new(Vec::new()),
        }
    }

    pub fn deletes(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }

    pub async fn stored_keys(&self) -> Vec<String> {
        self.inner.list("").await.unwrap()
    }
}

#[async_trait]
impl ObjectStore for FlakyBlobStore {
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        self.inner.exists(key).await
    }

    async fn head(&self, key: &str) -> StorageResult<ObjectMeta> {
        self.inner.head(key).await
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()> {
        if self.hold_uploads.load(Ordering::SeqCst) {
            self.put_started.notify_one();
            self.release.notified().await;
        }
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("injected upload failure".to_string()));
        }
        self.inner.put(key, data).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.deletes.lock().unwrap().push(key.to_string());
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("injected delete failure".to_string()));
        }
        self.inner.delete(key).await
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        self.inner.list(prefix).await
    }

    fn object_url(&self, key: &str) -> StorageResult<String> {
        self.inner.object_url(key)
    }

    fn backend_name(&self) -> &'static str {
        "flaky"
    }
}

/// SQLite document store with injectable write and per-note delete failures.
#[allow(dead_code)]
pub struct FlakyDocStore {
    inner: SqliteStore,
    pub fail_writes: AtomicBool,
    fail_deletes_for: Mutex<HashSet<NoteId>>,
    pub writes: AtomicUsize,
    pub subscribes: AtomicUsize,
}

#[allow(dead_code)]
impl FlakyDocStore {
    pub async fn new() -> Self {
        Self {
            inner: SqliteStore::in_memory().await.unwrap(),
            fail_writes: AtomicBool::new(false),
            fail_deletes_for: Mutex::new(HashSet::new()),
            writes: AtomicUsize::new(0),
            subscribes: AtomicUsize::new(0),
        }
    }

    pub fn fail_delete_for(&self, id: &NoteId) {
        self.fail_deletes_for.lock().unwrap().insert(id.clone());
    }

    fn injected(what: &str) -> DocStoreError {
        DocStoreError::Io(std::io::Error::other(format!("injected {what} failure")))
    }
}

#[async_trait]
impl NoteRepo for FlakyDocStore {
    fn generate_id(&self) -> NoteId {
        self.inner.generate_id()
    }

    async fn set_note(&self, owner: &UserId, note: NoteWrite) -> DocStoreResult<Note> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::injected("write"));
        }
        self.inner.set_note(owner, note).await
    }

    async fn merge_note(
        &self,
        owner: &UserId,
        id: &NoteId,
        patch: NotePatch,
    ) -> DocStoreResult<Note> {
        self.inner.merge_note(owner, id, patch).await
    }

    async fn delete_note(&self, owner: &UserId, id: &NoteId) -> DocStoreResult<()> {
        if self.fail_deletes_for.lock().unwrap().contains(id) {
            return Err(Self::injected("delete"));
        }
        self.inner.delete_note(owner, id).await
    }

    async fn get_note(&self, owner: &UserId, id: &NoteId) -> DocStoreResult<Option<Note>> {
        self.inner.get_note(owner, id).await
    }

    async fn list_notes(&self, owner: &UserId) -> DocStoreResult<Vec<Note>> {
        self.inner.list_notes(owner).await
    }
}

#[async_trait]
impl DocumentStore for FlakyDocStore {
    async fn migrate(&self) -> DocStoreResult<()> {
        self.inner.migrate().await
    }

    async fn subscribe(&self, owner: &UserId) -> DocStoreResult<NoteSubscription> {
        self.subscribes.fetch_add(1, Ordering::SeqCst);
        self.inner.subscribe(owner).await
    }

    async fn health_check(&self) -> DocStoreResult<()> {
        self.inner.health_check().await
    }
}

/// Microphone that replays fixed chunks; the channel closes on stop.
#[allow(dead_code)]
pub struct ScriptedMic {
    chunks: Vec<Bytes>,
    pub deny: AtomicBool,
    pub starts: AtomicUsize,
    sender: Mutex<Option<mpsc::Sender<Bytes>>>,
}

#[allow(dead_code)]
impl ScriptedMic {
    pub fn new(chunks: &[&'static [u8]]) -> Self {
        Self {
            chunks: chunks.iter().map(|c| Bytes::from_static(c)).collect(),
            deny: AtomicBool::new(false),
            starts: AtomicUsize::new(0),
            sender: Mutex::new(None),
        }
    }
}

#[async_trait]
impl CaptureDevice for ScriptedMic {
    async fn request_access(&self) -> ClientResult<()> {
        if self.deny.load(Ordering::SeqCst) {
            return Err(ClientError::Recorder(
                "NotAllowedError: permission denied".to_string(),
            ));
        }
        Ok(())
    }

    async fn start(&self, _timeslice: Duration) -> ClientResult<mpsc::Receiver<Bytes>> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::channel(self.chunks.len().max(1));
        for chunk in &self.chunks {
            tx.try_send(chunk.clone())
                .map_err(|e| ClientError::Recorder(e.to_string()))?;
        }
        *self.sender.lock().unwrap() = Some(tx);
        Ok(rx)
    }

    async fn stop(&self) -> ClientResult<()> {
        self.sender.lock().unwrap().take();
        Ok(())
    }
}
