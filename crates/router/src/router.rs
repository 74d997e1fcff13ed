//! Lifecycle and request routing.

use crate::background::BackgroundWrites;
use crate::cache::CacheStorage;
use crate::error::{RouterError, RouterResult};
use crate::fetch::Fetcher;
use crate::lifecycle::WorkerState;
use crate::request::{Request, Response};
use futures::future::try_join_all;
use jotpad_core::config::RouterConfig;
use jotpad_storage::ObjectStore;
use reqwest::{Method, Url};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::instrument;

/// What the router does with an intercepted request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchDisposition {
    /// Not handled; the request goes to the network untouched.
    Passthrough,
    /// Answered by the router.
    Respond(Response),
}

/// Offline cache router for one cache generation.
pub struct CacheRouter {
    generation: String,
    origin: Url,
    manifest: Vec<Url>,
    fallback: Url,
    cache: CacheStorage,
    fetcher: Arc<dyn Fetcher>,
    state: watch::Sender<WorkerState>,
    background: BackgroundWrites,
}

impl CacheRouter {
    pub fn new(
        config: &RouterConfig,
        store: Arc<dyn ObjectStore>,
        fetcher: Arc<dyn Fetcher>,
    ) -> RouterResult<Self> {
        config.validate().map_err(RouterError::Config)?;

        let origin = parse_url(&config.origin)?;
        let resolve = |path: &str| {
            origin.join(path).map_err(|e| RouterError::InvalidUrl {
                url: path.to_string(),
                reason: e.to_string(),
            })
        };
        let manifest = config
            .manifest
            .iter()
            .map(|path| resolve(path))
            .collect::<RouterResult<Vec<_>>>()?;
        let fallback = resolve(&config.fallback_document)?;

        let (state, _) = watch::channel(WorkerState::Parsed);
        Ok(Self {
            generation: config.generation.clone(),
            origin,
            manifest,
            fallback,
            cache: CacheStorage::new(store),
            fetcher,
            state,
            background: BackgroundWrites::default(),
        })
    }

    pub fn generation(&self) -> &str {
        &self.generation
    }

    pub fn state(&self) -> WorkerState {
        *self.state.borrow()
    }

    /// Observe lifecycle transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<WorkerState> {
        self.state.subscribe()
    }

    pub fn cache(&self) -> &CacheStorage {
        &self.cache
    }

    fn transition(&self, expected: WorkerState, next: WorkerState) -> RouterResult<()> {
        let mut result = Ok(());
        self.state.send_if_modified(|current| {
            if *current == expected {
                *current = next;
                true
            } else {
                result = Err(RouterError::InvalidState {
                    from: *current,
                    to: next,
                });
                false
            }
        });
        result
    }

    /// Fetch and cache every manifest asset.
    ///
    /// All-or-nothing: if any asset fails (including a non-2xx status) this
    /// install leaves no new entries behind and the router becomes
    /// `Redundant`. Entries persisted by an earlier install of the same
    /// generation are kept.
    #[instrument(skip(self), fields(generation = %self.generation))]
    pub async fn install(&self) -> RouterResult<()> {
        self.transition(WorkerState::Parsed, WorkerState::Installing)?;

        match self.precache().await {
            Ok(count) => {
                self.state.send_replace(WorkerState::Installed);
                tracing::info!(assets = count, "Installed cache generation");
                Ok(())
            }
            Err(e) => {
                self.state.send_replace(WorkerState::Redundant);
                tracing::warn!(error = %e, "Install failed");
                Err(e)
            }
        }
    }

    /// Take over a generation a previous run already installed.
    ///
    /// Moves `Parsed` to `Installed` without touching the network when every
    /// manifest asset is cached. Returns `false` and stays `Parsed` otherwise.
    #[instrument(skip(self), fields(generation = %self.generation))]
    pub async fn resume(&self) -> RouterResult<bool> {
        if self.state() != WorkerState::Parsed {
            return Err(RouterError::InvalidState {
                from: self.state(),
                to: WorkerState::Installed,
            });
        }
        for request in self.manifest_requests() {
            if !self.cache.contains(&self.generation, &request).await? {
                tracing::debug!(url = %request.url, "Cached generation incomplete");
                return Ok(false);
            }
        }
        self.transition(WorkerState::Parsed, WorkerState::Installed)?;
        tracing::info!("Resumed cached generation");
        Ok(true)
    }

    fn manifest_requests(&self) -> Vec<Request> {
        self.manifest
            .iter()
            .map(|url| Request::asset(url.clone(), crate::request::Destination::Other))
            .collect()
    }

    async fn precache(&self) -> RouterResult<usize> {
        let requests = self.manifest_requests();

        // Every response is in hand before anything is written.
        let responses = try_join_all(requests.iter().map(|request| async move {
            let response = self.fetcher.fetch(request).await?;
            if !response.is_success() {
                return Err(RouterError::Status {
                    url: request.url.to_string(),
                    status: response.status,
                });
            }
            Ok(response)
        }))
        .await?;

        let mut added = Vec::new();
        for (request, response) in requests.iter().zip(&responses) {
            let written = match self.cache.contains(&self.generation, request).await {
                Ok(existed) => self
                    .cache
                    .put(&self.generation, request, response)
                    .await
                    .map(|()| existed),
                Err(e) => Err(e),
            };
            match written {
                Ok(false) => added.push(request),
                Ok(true) => {}
                Err(e) => {
                    self.discard(&added).await;
                    return Err(e);
                }
            }
        }
        Ok(responses.len())
    }

    /// Remove entries a failed install added.
    async fn discard(&self, requests: &[&Request]) {
        for request in requests {
            if let Err(e) = self.cache.delete(&self.generation, request).await {
                tracing::warn!(url = %request.url, error = %e, "Failed to clean up partial install");
            }
        }
    }

    /// Evict every other cache generation and start intercepting requests.
    ///
    /// Returns the names of the evicted generations.
    #[instrument(skip(self), fields(generation = %self.generation))]
    pub async fn activate(&self) -> RouterResult<Vec<String>> {
        self.transition(WorkerState::Installed, WorkerState::Activating)?;

        let mut removed = Vec::new();
        for name in self.cache.generations().await? {
            if name == self.generation {
                continue;
            }
            match self.cache.delete_generation(&name).await {
                Ok(entries) => {
                    tracing::info!(old_generation = %name, entries, "Evicted cache generation");
                    removed.push(name);
                }
                Err(e) => {
                    tracing::warn!(old_generation = %name, error = %e, "Failed to evict cache generation");
                }
            }
        }

        self.state.send_replace(WorkerState::Activated);
        Ok(removed)
    }

    /// Route an intercepted request. Never fails: every path resolves to a
    /// response or passes the request through.
    pub async fn handle_fetch(&self, request: Request) -> FetchDisposition {
        if !self.state().controls_clients()
            || request.method != Method::GET
            || request.url.origin() != self.origin.origin()
        {
            return FetchDisposition::Passthrough;
        }

        let response = if request.is_document() {
            self.network_first(&request).await
        } else {
            self.cache_first(&request).await
        };
        FetchDisposition::Respond(response)
    }

    async fn network_first(&self, request: &Request) -> Response {
        match self.fetcher.fetch(request).await {
            Ok(response) => {
                self.store_in_background(request, &response).await;
                response
            }
            Err(e) => {
                tracing::debug!(url = %request.url, error = %e, "Network failed, serving from cache");
                match self.lookup(request).await {
                    Some(cached) => cached,
                    None => self.fallback_response().await,
                }
            }
        }
    }

    async fn cache_first(&self, request: &Request) -> Response {
        if let Some(cached) = self.lookup(request).await {
            return cached;
        }
        match self.fetcher.fetch(request).await {
            Ok(response) => {
                self.store_in_background(request, &response).await;
                response
            }
            Err(e) => {
                tracing::debug!(url = %request.url, error = %e, "Network failed, serving root document");
                self.fallback_response().await
            }
        }
    }

    async fn lookup(&self, request: &Request) -> Option<Response> {
        match self.cache.match_request(&self.generation, request).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(url = %request.url, error = %e, "Cache lookup failed");
                None
            }
        }
    }

    async fn fallback_response(&self) -> Response {
        let root = Request::navigate(self.fallback.clone());
        match self.lookup(&root).await {
            Some(cached) => cached,
            None => {
                tracing::warn!(fallback = %self.fallback, "Root document missing from cache");
                Response::offline()
            }
        }
    }

    /// Copy a successful response into the cache without delaying the caller.
    async fn store_in_background(&self, request: &Request, response: &Response) {
        if !response.is_success() {
            return;
        }
        let cache = self.cache.clone();
        let generation = self.generation.clone();
        let request = request.clone();
        let response = response.clone();
        let handle = tokio::spawn(async move {
            if let Err(e) = cache.put(&generation, &request, &response).await {
                tracing::warn!(url = %request.url, error = %e, "Background cache write failed");
            }
        });
        self.background.register(handle).await;
    }

    /// Wait for all background cache writes issued so far.
    pub async fn flush_background(&self) {
        self.background.flush().await;
    }

    /// Number of background cache writes still running.
    pub async fn pending_writes(&self) -> usize {
        self.background.pending().await
    }
}

fn parse_url(url: &str) -> RouterResult<Url> {
    Url::parse(url).map_err(|e| RouterError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}
