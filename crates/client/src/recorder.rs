//! Voice recording over a capture device.

use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use jotpad_core::StagedVoice;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

/// Local audio capture.
#[async_trait]
pub trait CaptureDevice: Send + Sync + 'static {
    /// Ask for microphone access.
    async fn request_access(&self) -> ClientResult<()>;

    /// Start capturing. A chunk is emitted every `timeslice`; the channel
    /// closes after [`stop`](Self::stop).
    async fn start(&self, timeslice: Duration) -> ClientResult<mpsc::Receiver<Bytes>>;

    async fn stop(&self) -> ClientResult<()>;
}

/// Result of toggling the recorder.
#[derive(Debug, PartialEq, Eq)]
pub enum RecorderEvent {
    Started,
    Stopped(StagedVoice),
    /// Nothing to do: a concurrent toggle already acted.
    Ignored,
}

/// At most one recording session at a time.
pub struct Recorder {
    device: Arc<dyn CaptureDevice>,
    timeslice: Duration,
    recording: AtomicBool,
    /// Collector task of the active session.
    active: Mutex<Option<JoinHandle<Bytes>>>,
}

impl Recorder {
    pub fn new(device: Arc<dyn CaptureDevice>, timeslice: Duration) -> Self {
        Self {
            device,
            timeslice,
            recording: AtomicBool::new(false),
            active: Mutex::new(None),
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst)
    }

    /// Start a session. Returns `false` if one is already active.
    pub async fn start(&self) -> ClientResult<bool> {
        let mut active = self.active.lock().await;
        if active.is_some() {
            return Ok(false);
        }

        self.device.request_access().await?;
        let mut chunks = self.device.start(self.timeslice).await?;

        *active = Some(tokio::spawn(async move {
            let mut audio = BytesMut::new();
            while let Some(chunk) = chunks.recv().await {
                if !chunk.is_empty() {
                    audio.extend_from_slice(&chunk);
                }
            }
            audio.freeze()
        }));
        self.recording.store(true, Ordering::SeqCst);
        tracing::debug!("Recording started");
        Ok(true)
    }

    /// Stop the active session and return the recording.
    ///
    /// Returns `None` if nothing was recording. An empty recording is an error.
    pub async fn stop(&self) -> ClientResult<Option<StagedVoice>> {
        let mut active = self.active.lock().await;
        let Some(collector) = active.take() else {
            return Ok(None);
        };
        self.recording.store(false, Ordering::SeqCst);

        if let Err(e) = self.device.stop().await {
            collector.abort();
            return Err(e);
        }
        let audio = collector
            .await
            .map_err(|e| ClientError::Recorder(format!("collector failed: {e}")))?;
        tracing::debug!(size = audio.len(), "Recording stopped");
        Ok(Some(StagedVoice::new(audio)?))
    }

    pub async fn toggle(&self) -> ClientResult<RecorderEvent> {
        if self.is_recording() {
            Ok(match self.stop().await? {
                Some(voice) => RecorderEvent::Stopped(voice),
                None => RecorderEvent::Ignored,
            })
        } else if self.start().await? {
            Ok(RecorderEvent::Started)
        } else {
            Ok(RecorderEvent::Ignored)
        }
    }
}
