//! Note sync and media client for jotpad.
//!
//! This crate provides:
//! - Session lifecycle: one live note subscription per signed-in user
//! - Note creation with blob upload and inline fallback, deletion, pinning,
//!   bulk clear and local search
//! - Voice recording over a `CaptureDevice`
//! - A `Command` enum dispatched through a single entry point
//! - Tracing setup

pub mod auth;
pub mod client;
pub mod commands;
pub mod error;
pub mod recorder;
mod state;
pub mod status;
pub mod telemetry;

pub use auth::{AuthService, LocalAuth, User};
pub use client::{NoteClient, View};
pub use commands::{ClearReport, Command, Outcome};
pub use error::{ClientError, ClientResult, ErrorKind};
pub use recorder::{CaptureDevice, Recorder, RecorderEvent};
pub use status::SyncStatus;

use jotpad_core::config::AppConfig;
use std::sync::Arc;

/// Build a client with the configured document and blob stores and start
/// following session changes.
pub async fn from_config(
    config: &AppConfig,
    auth: Arc<dyn AuthService>,
    device: Arc<dyn CaptureDevice>,
) -> ClientResult<Arc<NoteClient>> {
    config.validate()?;
    let blobs = jotpad_storage::from_config(&config.storage).await?;
    let docs = jotpad_docstore::from_config(&config.docstore).await?;
    tracing::info!(blob_backend = blobs.backend_name(), "Note client configured");

    let client = Arc::new(NoteClient::new(
        auth,
        docs,
        blobs,
        device,
        config.client.clone(),
    ));
    client.spawn_session_listener();
    Ok(client)
}
