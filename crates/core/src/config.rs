//! Configuration types shared across crates.

use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "JOTPAD_";

/// Blob storage backend configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Local filesystem storage.
    Filesystem {
        /// Root directory for stored objects.
        path: PathBuf,
        /// Base URL objects are served from (e.g., "https://media.example.com").
        /// When unset, objects are addressed with `file://` URLs.
        #[serde(default)]
        public_base_url: Option<String>,
    },
    /// In-process storage, lost on restart. Intended for tests and previews.
    Memory {
        #[serde(default)]
        public_base_url: Option<String>,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Filesystem {
            path: PathBuf::from("./data/blobs"),
            public_base_url: None,
        }
    }
}

impl StorageConfig {
    /// Validate storage configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        let base = match self {
            Self::Filesystem {
                public_base_url, ..
            }
            | Self::Memory { public_base_url } => public_base_url.as_deref(),
        };
        match base {
            Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => Err(
                format!("storage.public_base_url must be an http(s) URL, got {url:?}"),
            ),
            _ => Ok(()),
        }
    }
}

/// Document store configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DocStoreConfig {
    /// SQLite database file.
    Sqlite {
        /// Database file path.
        path: PathBuf,
    },
    /// In-memory SQLite database, lost on restart.
    Memory,
}

impl Default for DocStoreConfig {
    fn default() -> Self {
        Self::Sqlite {
            path: PathBuf::from("./data/notes.db"),
        }
    }
}

/// Offline cache router configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Cache generation name. Bump it on every deploy to evict stale assets.
    #[serde(default = "default_generation")]
    pub generation: String,
    /// Origin the router serves (scheme, host and port); other origins pass through.
    #[serde(default = "default_origin")]
    pub origin: String,
    /// Assets fetched and cached at install time, relative to the origin.
    #[serde(default = "default_manifest")]
    pub manifest: Vec<String>,
    /// Root document served as the last-resort fallback. Must be in the manifest.
    #[serde(default = "default_fallback_document")]
    pub fallback_document: String,
    /// Where cache generations are persisted.
    #[serde(default = "default_cache_storage")]
    pub cache: StorageConfig,
    /// Network fetch timeout in seconds.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

fn default_generation() -> String {
    "note-pwa-v3".to_string()
}

fn default_origin() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_manifest() -> Vec<String> {
    [
        "./",
        "./index.html",
        "./style.css",
        "./app.js",
        "./manifest.json",
        "./icons/icon-192.png",
        "./icons/icon-512.png",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_fallback_document() -> String {
    "./index.html".to_string()
}

fn default_cache_storage() -> StorageConfig {
    StorageConfig::Filesystem {
        path: PathBuf::from("./data/cache"),
        public_base_url: None,
    }
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            generation: default_generation(),
            origin: default_origin(),
            manifest: default_manifest(),
            fallback_document: default_fallback_document(),
            cache: default_cache_storage(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

impl RouterConfig {
    /// Get the fetch timeout as a Duration.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Validate router configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.generation.is_empty()
            || !self
                .generation
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
            || self.generation.contains("..")
        {
            return Err(format!(
                "router.generation must be a non-empty [A-Za-z0-9._-] name, got {:?}",
                self.generation
            ));
        }
        if !self.manifest.contains(&self.fallback_document) {
            return Err(format!(
                "router.fallback_document {:?} must be listed in router.manifest",
                self.fallback_document
            ));
        }
        if self.fetch_timeout_secs == 0 {
            return Err("router.fetch_timeout_secs cannot be 0".to_string());
        }
        self.cache.validate()
    }
}

/// Sync client configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Maximum accepted size of a staged image in bytes.
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,
    /// Interval at which the capture device emits recording chunks.
    #[serde(default = "default_recorder_timeslice_ms")]
    pub recorder_timeslice_ms: u64,
    /// How long a success message stays up before the status returns to
    /// "Connected & Synced".
    #[serde(default = "default_status_revert_ms")]
    pub status_revert_ms: u64,
}

fn default_max_image_bytes() -> usize {
    crate::MAX_IMAGE_BYTES
}

fn default_recorder_timeslice_ms() -> u64 {
    1000
}

fn default_status_revert_ms() -> u64 {
    2000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_image_bytes: default_max_image_bytes(),
            recorder_timeslice_ms: default_recorder_timeslice_ms(),
            status_revert_ms: default_status_revert_ms(),
        }
    }
}

impl ClientConfig {
    pub fn recorder_timeslice(&self) -> Duration {
        Duration::from_millis(self.recorder_timeslice_ms)
    }

    pub fn status_revert(&self) -> Duration {
        Duration::from_millis(self.status_revert_ms)
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Blob storage for note media.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Note document store.
    #[serde(default)]
    pub docstore: DocStoreConfig,
    /// Offline cache router.
    #[serde(default)]
    pub router: RouterConfig,
    /// Sync client.
    #[serde(default)]
    pub client: ClientConfig,
}

impl AppConfig {
    /// Create a test configuration backed entirely by in-memory stores.
    ///
    /// **For testing only.**
    pub fn for_testing() -> Self {
        Self {
            storage: StorageConfig::Memory {
                public_base_url: Some("https://media.test".to_string()),
            },
            docstore: DocStoreConfig::Memory,
            router: RouterConfig {
                cache: StorageConfig::Memory {
                    public_base_url: None,
                },
                ..RouterConfig::default()
            },
            client: ClientConfig::default(),
        }
    }

    /// Load configuration from defaults, an optional TOML file and `JOTPAD_` env vars.
    ///
    /// Nested keys use `__` as separator, e.g. `JOTPAD_ROUTER__GENERATION=note-pwa-v4`.
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            if !path.exists() {
                return Err(crate::Error::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            figment = figment.merge(Toml::file(path));
        }

        let config: AppConfig = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> crate::Result<()> {
        self.storage.validate().map_err(crate::Error::Config)?;
        self.router.validate().map_err(crate::Error::Config)?;
        if self.client.max_image_bytes == 0 {
            return Err(crate::Error::Config(
                "client.max_image_bytes cannot be 0".to_string(),
            ));
        }
        Ok(())
    }
}
