use async_trait::async_trait;
use bytes::Bytes;
use jotpad_router::{Fetcher, Request, Response, RouterError, RouterResult};
use jotpad_storage::{MemoryBackend, ObjectMeta, ObjectStore, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Scripted network: fixed responses per URL, switchable offline.
///
/// Unknown URLs answer 404.
#[allow(dead_code)]
pub struct MockFetcher {
    routes: Mutex<HashMap<String, Response>>,
    online: AtomicBool,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl MockFetcher {
    pub fn new() -> Self {
        Self {
            routes: Mutex::new(HashMap::new()),
            online: AtomicBool::new(true),
            calls: AtomicUsize::new(0),
        }
    }

    /// Serve every default manifest asset with a body naming it.
    pub fn with_manifest(origin: &str, manifest: &[String]) -> Self {
        let fetcher = Self::new();
        let base = reqwest::Url::parse(origin).unwrap();
        for path in manifest {
            let url = base.join(path).unwrap();
            fetcher.route(url.as_str(), Response::new(200, format!("v1:{path}")));
        }
        fetcher
    }

    pub fn route(&self, url: &str, response: Response) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), response);
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, request: &Request) -> RouterResult<Response> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.online.load(Ordering::SeqCst) {
            return Err(RouterError::Unreachable(request.url.to_string()));
        }
        let mut url = request.url.clone();
        url.set_fragment(None);
        Ok(self
            .routes
            .lock()
            .unwrap()
            .get(url.as_str())
            .cloned()
            .unwrap_or_else(|| Response::new(404, "not found")))
    }
}

/// Memory store whose writes start failing once a put budget is spent.
#[allow(dead_code)]
pub struct FailingPutStore {
    inner: MemoryBackend,
    puts_left: AtomicUsize,
}

#[allow(dead_code)]
impl FailingPutStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryBackend::default(),
            puts_left: AtomicUsize::new(usize::MAX),
        }
    }

    pub fn fail_after(&self, puts: usize) {
        self.puts_left.store(puts, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStore for FailingPutStore {
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
        let spent = self
            .puts_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_err();
        if spent {
            return Err(StorageError::Unavailable("disk full".to_string()));
        }
        self.inner.put(key, data).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.inner.delete(key).await
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        self.inner.list(prefix).await
    }

    fn object_url(&self, key: &str) -> StorageResult<String> {
        self.inner.object_url(key)
    }

    fn backend_name(&self) -> &'static str {
        "failing-put"
    }
}
