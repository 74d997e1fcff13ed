//! In-process storage backend.
//!
//! Objects live in a sorted map behind a `RwLock`; everything is lost when the
//! backend is dropped.

use crate::error::{StorageError, StorageResult};
use crate::traits::{ObjectMeta, ObjectStore, validate_key};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::instrument;

struct StoredObject {
    data: Bytes,
    last_modified: OffsetDateTime,
}

/// In-memory object store.
pub struct MemoryBackend {
    objects: RwLock<BTreeMap<String, StoredObject>>,
    public_base_url: Option<String>,
}

impl MemoryBackend {
    pub fn new(public_base_url: Option<String>) -> Self {
        Self {
            objects: RwLock::new(BTreeMap::new()),
            public_base_url,
        }
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl ObjectStore for MemoryBackend {
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        validate_key(key)?;
        Ok(self.objects.read().await.contains_key(key))
    }

    async fn head(&self, key: &str) -> StorageResult<ObjectMeta> {
        validate_key(key)?;
        let objects = self.objects.read().await;
        let object = objects
            .get(key)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;
        Ok(ObjectMeta {
            size: object.data.len() as u64,
            last_modified: Some(object.last_modified),
        })
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        validate_key(key)?;
        self.objects
            .read()
            .await
            .get(key)
            .map(|object| object.data.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    #[instrument(skip(self, data), fields(backend = "memory", size = data.len()))]
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()> {
        validate_key(key)?;
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                data,
                last_modified: OffsetDateTime::now_utc(),
            },
        );
        Ok(())
    }

    #[instrument(skip(self), fields(backend = "memory"))]
    async fn delete(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        self.objects
            .write()
            .await
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let objects = self.objects.read().await;
        Ok(objects
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }

    fn object_url(&self, key: &str) -> StorageResult<String> {
        validate_key(key)?;
        Ok(match &self.public_base_url {
            Some(base) => crate::join_url(base, key),
            None => format!("memory://{key}"),
        })
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
