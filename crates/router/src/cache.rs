//! Versioned response cache persisted through an object store.
//!
//! Entries live at `caches/{generation}/{sha256(request key)}`. Each object is
//! a big-endian `u32` header length, a JSON header, then the raw body.

use crate::error::{RouterError, RouterResult};
use crate::request::{Request, Response};
use bytes::{BufMut, Bytes, BytesMut};
use jotpad_storage::{ObjectStore, StorageError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::sync::Arc;

const CACHE_PREFIX: &str = "caches/";

#[derive(Serialize, Deserialize)]
struct EntryHeader {
    key: String,
    status: u16,
    headers: Vec<(String, String)>,
}

/// Cache generations over an object store.
#[derive(Clone)]
pub struct CacheStorage {
    store: Arc<dyn ObjectStore>,
}

impl CacheStorage {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    fn generation_prefix(generation: &str) -> String {
        format!("{CACHE_PREFIX}{generation}/")
    }

    fn entry_key(generation: &str, request_key: &str) -> String {
        let digest = Sha256::digest(request_key.as_bytes());
        format!("{}{}", Self::generation_prefix(generation), hex::encode(digest))
    }

    /// Names of every generation with at least one entry.
    pub async fn generations(&self) -> RouterResult<Vec<String>> {
        let keys = self.store.list(CACHE_PREFIX).await?;
        let names: BTreeSet<String> = keys
            .iter()
            .filter_map(|key| key.strip_prefix(CACHE_PREFIX))
            .filter_map(|rest| rest.split_once('/').map(|(name, _)| name.to_string()))
            .collect();
        Ok(names.into_iter().collect())
    }

    /// Number of entries in a generation.
    pub async fn len(&self, generation: &str) -> RouterResult<usize> {
        Ok(self
            .store
            .list(&Self::generation_prefix(generation))
            .await?
            .len())
    }

    /// Delete a whole generation. Returns the number of entries removed.
    pub async fn delete_generation(&self, generation: &str) -> RouterResult<usize> {
        let keys = self
            .store
            .list(&Self::generation_prefix(generation))
            .await?;
        let mut removed = 0;
        for key in keys {
            match self.store.delete(&key).await {
                Ok(()) => removed += 1,
                // Raced with another deleter.
                Err(StorageError::NotFound(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(removed)
    }

    /// Whether a generation holds an entry for a request.
    pub async fn contains(&self, generation: &str, request: &Request) -> RouterResult<bool> {
        let object_key = Self::entry_key(generation, &request.cache_key());
        Ok(self.store.exists(&object_key).await?)
    }

    /// Remove the entry for a request. Returns `false` if there was none.
    pub async fn delete(&self, generation: &str, request: &Request) -> RouterResult<bool> {
        let object_key = Self::entry_key(generation, &request.cache_key());
        match self.store.delete(&object_key).await {
            Ok(()) => Ok(true),
            Err(StorageError::NotFound(_)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Store a response for a request, replacing any previous entry.
    pub async fn put(
        &self,
        generation: &str,
        request: &Request,
        response: &Response,
    ) -> RouterResult<()> {
        let request_key = request.cache_key();
        let encoded = encode_entry(&request_key, response)?;
        self.store
            .put(&Self::entry_key(generation, &request_key), encoded)
            .await?;
        Ok(())
    }

    /// Look up the stored response for a request.
    pub async fn match_request(
        &self,
        generation: &str,
        request: &Request,
    ) -> RouterResult<Option<Response>> {
        let request_key = request.cache_key();
        let object_key = Self::entry_key(generation, &request_key);
        let data = match self.store.get(&object_key).await {
            Ok(data) => data,
            Err(StorageError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let (stored_key, response) = decode_entry(&object_key, data)?;
        if stored_key != request_key {
            return Err(RouterError::CorruptEntry {
                key: object_key,
                reason: format!("entry belongs to {stored_key:?}"),
            });
        }
        Ok(Some(response))
    }
}

fn encode_entry(request_key: &str, response: &Response) -> RouterResult<Bytes> {
    let header = serde_json::to_vec(&EntryHeader {
        key: request_key.to_string(),
        status: response.status,
        headers: response.headers.clone(),
    })
    .map_err(|e| RouterError::CorruptEntry {
        key: request_key.to_string(),
        reason: format!("header encoding failed: {e}"),
    })?;
    let header_len = u32::try_from(header.len()).map_err(|_| RouterError::CorruptEntry {
        key: request_key.to_string(),
        reason: "header too large".to_string(),
    })?;

    let mut buf = BytesMut::with_capacity(4 + header.len() + response.body.len());
    buf.put_u32(header_len);
    buf.put_slice(&header);
    buf.put_slice(&response.body);
    Ok(buf.freeze())
}

fn decode_entry(object_key: &str, data: Bytes) -> RouterResult<(String, Response)> {
    let corrupt = |reason: String| RouterError::CorruptEntry {
        key: object_key.to_string(),
        reason,
    };

    let len_bytes: [u8; 4] = data
        .get(..4)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| corrupt("truncated length prefix".to_string()))?;
    let header_end = 4 + u32::from_be_bytes(len_bytes) as usize;
    if data.len() < header_end {
        return Err(corrupt("truncated header".to_string()));
    }

    let header: EntryHeader = serde_json::from_slice(&data[4..header_end])
        .map_err(|e| corrupt(format!("invalid header: {e}")))?;
    Ok((
        header.key,
        Response {
            status: header.status,
            headers: header.headers,
            body: data.slice(header_end..),
        },
    ))
}
