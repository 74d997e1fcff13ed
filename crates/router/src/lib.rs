//! Offline cache router for jotpad.
//!
//! This crate provides:
//! - The install / activate lifecycle over versioned cache generations
//! - Request routing: network-first for documents, cache-first for assets,
//!   with the cached root document as last resort
//! - Cache persistence through any `ObjectStore`
//! - An HTTP fetcher built on `reqwest`

mod background;
pub mod cache;
pub mod error;
pub mod fetch;
pub mod lifecycle;
pub mod request;
pub mod router;

pub use cache::CacheStorage;
pub use error::{RouterError, RouterResult};
pub use fetch::{Fetcher, HttpFetcher};
pub use lifecycle::WorkerState;
pub use request::{Destination, Request, RequestMode, Response};
pub use router::{CacheRouter, FetchDisposition};

use jotpad_core::config::RouterConfig;
use std::sync::Arc;

/// Create a router from configuration, with cache storage and an HTTP fetcher.
pub async fn from_config(config: &RouterConfig) -> RouterResult<CacheRouter> {
    let store = jotpad_storage::from_config(&config.cache).await?;
    let fetcher = HttpFetcher::new(config.fetch_timeout())?;
    tracing::info!(
        generation = %config.generation,
        backend = store.backend_name(),
        "Cache router configured"
    );
    CacheRouter::new(config, store, Arc::new(fetcher))
}
