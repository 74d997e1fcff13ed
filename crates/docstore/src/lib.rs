//! Note document store for jotpad.
//!
//! This crate provides:
//! - The `DocumentStore` trait over a per-user note collection
//! - A SQLite implementation (file-backed or in-memory)
//! - Live subscriptions that deliver full collection snapshots on every change

pub mod error;
pub mod models;
pub mod repos;
pub mod store;
pub mod subscription;

pub use error::{DocStoreError, DocStoreResult};
pub use repos::NoteRepo;
pub use store::{DocumentStore, SqliteStore};
pub use subscription::{NoteSubscription, Snapshot};

use jotpad_core::config::DocStoreConfig;
use std::sync::Arc;

/// Create a document store from configuration.
pub async fn from_config(config: &DocStoreConfig) -> DocStoreResult<Arc<dyn DocumentStore>> {
    match config {
        DocStoreConfig::Sqlite { path } => {
            tracing::info!(path = %path.display(), "Opening SQLite document store");
            let store = SqliteStore::new(path).await?;
            Ok(Arc::new(store) as Arc<dyn DocumentStore>)
        }
        DocStoreConfig::Memory => {
            let store = SqliteStore::in_memory().await?;
            Ok(Arc::new(store) as Arc<dyn DocumentStore>)
        }
    }
}
