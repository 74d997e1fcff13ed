//! Blob storage abstraction and backends for jotpad.
//!
//! This crate provides:
//! - The `ObjectStore` trait used for note media and for persisted cache generations
//! - Durable uploads that return a retrievable URL
//! - Backends: local filesystem and in-memory

pub mod backends;
pub mod error;
pub mod traits;

pub use backends::{filesystem::FilesystemBackend, memory::MemoryBackend};
pub use error::{StorageError, StorageResult};
pub use traits::{ObjectMeta, ObjectStore};

use jotpad_core::config::StorageConfig;
use std::sync::Arc;

/// Create an object store from configuration.
pub async fn from_config(config: &StorageConfig) -> StorageResult<Arc<dyn ObjectStore>> {
    config.validate().map_err(StorageError::Config)?;

    match config {
        StorageConfig::Filesystem {
            path,
            public_base_url,
        } => {
            let backend = FilesystemBackend::new(path, public_base_url.clone()).await?;
            Ok(Arc::new(backend))
        }
        StorageConfig::Memory { public_base_url } => {
            Ok(Arc::new(MemoryBackend::new(public_base_url.clone())))
        }
    }
}

/// Join a public base URL and an object key.
pub(crate) fn join_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key)
}
