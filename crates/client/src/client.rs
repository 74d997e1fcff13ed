//! Session lifecycle, note protocols and command dispatch.

use crate::auth::{AuthService, User};
use crate::commands::{ClearReport, Command, Outcome};
use crate::error::{ClientError, ClientResult};
use crate::recorder::{CaptureDevice, Recorder, RecorderEvent};
use crate::state::{AppState, Session};
use crate::status::SyncStatus;
use bytes::Bytes;
use futures::future::join_all;
use jotpad_core::config::ClientConfig;
use jotpad_core::media::{encode_inline, image_path, voice_path};
use jotpad_core::{
    MediaKind, MediaRef, Note, NoteId, NotePatch, NoteWrite, StagedImage, UserId, build_view,
    filter_notes,
};
use jotpad_docstore::DocumentStore;
use jotpad_storage::ObjectStore;
use std::sync::{Arc, Weak};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

/// Sorted local view of the signed-in user's notes.
pub type View = Arc<Vec<Note>>;

/// Note sync and media client.
///
/// Mirrors the signed-in user's collection into a local view and runs the
/// note protocols against the document and blob stores.
pub struct NoteClient {
    auth: Arc<dyn AuthService>,
    docs: Arc<dyn DocumentStore>,
    blobs: Arc<dyn ObjectStore>,
    recorder: Recorder,
    config: ClientConfig,
    state: Mutex<AppState>,
    /// Serializes session transitions. Never taken while `state` is held.
    transitions: Mutex<()>,
    view: Arc<watch::Sender<View>>,
    session: watch::Sender<Option<User>>,
    status: Arc<watch::Sender<SyncStatus>>,
}

impl NoteClient {
    pub fn new(
        auth: Arc<dyn AuthService>,
        docs: Arc<dyn DocumentStore>,
        blobs: Arc<dyn ObjectStore>,
        device: Arc<dyn CaptureDevice>,
        config: ClientConfig,
    ) -> Self {
        let recorder = Recorder::new(device, config.recorder_timeslice());
        Self {
            auth,
            docs,
            blobs,
            recorder,
            config,
            state: Mutex::new(AppState::default()),
            transitions: Mutex::new(()),
            view: Arc::new(watch::channel(View::default()).0),
            session: watch::channel(None).0,
            status: Arc::new(watch::channel(SyncStatus::signed_out()).0),
        }
    }

    // ---------------------------------------------------------------------
    // Observation
    // ---------------------------------------------------------------------

    /// Current sorted view.
    pub fn notes(&self) -> View {
        self.view.borrow().clone()
    }

    pub fn subscribe_view(&self) -> watch::Receiver<View> {
        self.view.subscribe()
    }

    pub fn current_user(&self) -> Option<User> {
        self.session.borrow().clone()
    }

    pub fn subscribe_session(&self) -> watch::Receiver<Option<User>> {
        self.session.subscribe()
    }

    pub fn status(&self) -> SyncStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    /// Current view filtered by the last search query.
    pub async fn visible_notes(&self) -> Vec<Note> {
        let query = self.state.lock().await.query.clone();
        filter_notes(&self.notes(), &query)
    }

    /// Staged image and voice presence.
    pub async fn staged(&self) -> (bool, bool) {
        let state = self.state.lock().await;
        (state.draft.image.is_some(), state.draft.voice.is_some())
    }

    pub async fn text(&self) -> String {
        self.state.lock().await.text.clone()
    }

    fn set_status(&self, status: SyncStatus) {
        tracing::debug!(status = %status, "Status changed");
        self.status.send_replace(status);
    }

    /// Show a success message, then fall back to the connected status unless
    /// something else was published in the meantime.
    fn flash_success(&self, message: &str) {
        let shown = SyncStatus::Online(message.to_string());
        self.set_status(shown.clone());

        let status = Arc::clone(&self.status);
        let delay = self.config.status_revert();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            status.send_if_modified(|current| {
                if *current == shown {
                    *current = SyncStatus::connected();
                    true
                } else {
                    false
                }
            });
        });
    }

    // ---------------------------------------------------------------------
    // Session lifecycle
    // ---------------------------------------------------------------------

    /// Follow the auth service's session announcements until it goes away.
    pub fn spawn_session_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let client: Weak<Self> = Arc::downgrade(self);
        let mut sessions = self.auth.subscribe();
        tokio::spawn(async move {
            loop {
                let user = sessions.borrow_and_update().clone();
                let Some(client) = client.upgrade() else {
                    break;
                };
                if let Err(e) = client.on_auth_changed(user).await {
                    tracing::error!(error = %e, "Failed to apply session change");
                }
                drop(client);
                if sessions.changed().await.is_err() {
                    break;
                }
            }
        })
    }

    /// Apply a session change.
    ///
    /// Signing in opens exactly one live subscription; any previous one is
    /// torn down first. Re-announcing the active user is a no-op.
    pub async fn on_auth_changed(&self, user: Option<User>) -> ClientResult<()> {
        let _transition = self.transitions.lock().await;

        let active_uid = {
            let state = self.state.lock().await;
            state.session.as_ref().map(|s| s.user.uid.clone())
        };
        if active_uid.as_ref() == user.as_ref().map(|u| &u.uid) {
            return Ok(());
        }

        self.teardown_session().await;
        self.session.send_replace(None);

        let Some(user) = user else {
            self.set_status(SyncStatus::signed_out());
            return Ok(());
        };

        let mut subscription = match self.docs.subscribe(&user.uid).await {
            Ok(subscription) => subscription,
            Err(e) => {
                self.set_status(SyncStatus::Offline(format!("Error loading notes: {e}")));
                return Err(e.into());
            }
        };

        // First snapshot is immediate, so the view is populated on return.
        if let Some(snapshot) = subscription.next().await {
            self.view.send_replace(Arc::new(build_view(&snapshot)));
        }
        let view = Arc::clone(&self.view);
        let pump = tokio::spawn(async move {
            while let Some(snapshot) = subscription.next().await {
                view.send_replace(Arc::new(build_view(&snapshot)));
            }
        });

        self.state.lock().await.session = Some(Session {
            user: user.clone(),
            pump,
        });
        tracing::info!(uid = %user.uid, "Session started");
        self.session.send_replace(Some(user));
        self.set_status(SyncStatus::connected());
        Ok(())
    }

    /// Stop the live subscription and drop per-user state.
    async fn teardown_session(&self) {
        let session = {
            let mut state = self.state.lock().await;
            let session = state.session.take();
            if session.is_some() {
                state.reset_input();
            }
            session
        };
        if let Some(session) = session {
            session.pump.abort();
            let _ = session.pump.await;
            tracing::info!(uid = %session.user.uid, "Session ended");
        }
        self.view.send_replace(View::default());
    }

    pub async fn sign_in(&self) -> ClientResult<User> {
        let user = self.auth.sign_in().await?;
        self.on_auth_changed(Some(user.clone())).await?;
        Ok(user)
    }

    pub async fn sign_out(&self) -> ClientResult<()> {
        self.auth.sign_out().await?;
        self.on_auth_changed(None).await
    }

    async fn owner(&self) -> ClientResult<UserId> {
        self.state.lock().await.owner()
    }

    // ---------------------------------------------------------------------
    // Local input
    // ---------------------------------------------------------------------

    pub async fn set_text(&self, text: impl Into<String>) {
        self.state.lock().await.text = text.into();
    }

    /// Stage an image for the next note, replacing any staged image.
    pub async fn stage_image(
        &self,
        data: Bytes,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
    ) -> ClientResult<()> {
        let image = StagedImage::new(data, file_name, content_type, self.config.max_image_bytes)?;
        self.state.lock().await.draft.image = Some(image);
        Ok(())
    }

    pub async fn remove_image(&self) {
        self.state.lock().await.draft.image = None;
    }

    pub async fn remove_voice(&self) {
        self.state.lock().await.draft.voice = None;
    }

    pub async fn clear_media(&self) {
        self.state.lock().await.draft.clear();
    }

    /// Start or stop voice recording. A finished recording is staged.
    pub async fn toggle_recording(&self) -> ClientResult<RecorderEvent> {
        match self.recorder.toggle().await {
            Ok(RecorderEvent::Started) => {
                self.set_status(SyncStatus::Recording("Recording voice note...".to_string()));
                Ok(RecorderEvent::Started)
            }
            Ok(RecorderEvent::Stopped(voice)) => {
                self.state.lock().await.draft.voice = Some(voice.clone());
                self.flash_success("Voice recorded successfully!");
                Ok(RecorderEvent::Stopped(voice))
            }
            Ok(RecorderEvent::Ignored) => Ok(RecorderEvent::Ignored),
            Err(e @ ClientError::Recorder(_)) => {
                tracing::warn!(error = %e, "Recorder failed");
                self.set_status(SyncStatus::Offline("Microphone access failed".to_string()));
                Err(e)
            }
            Err(e) => {
                self.set_status(SyncStatus::Offline(format!("Recording failed: {e}")));
                Err(e)
            }
        }
    }

    /// Update the search query and return the matching notes in view order.
    pub async fn search(&self, query: impl Into<String>) -> Vec<Note> {
        let query = query.into();
        self.state.lock().await.query = query.clone();
        filter_notes(&self.notes(), &query)
    }

    // ---------------------------------------------------------------------
    // Note protocols
    // ---------------------------------------------------------------------

    /// Create a note from the current text and staged media.
    ///
    /// Staged input is cleared only once the document write succeeds.
    pub async fn add_note(&self) -> ClientResult<Note> {
        let (owner, text, draft) = {
            let state = self.state.lock().await;
            let text = state.text.trim().to_string();
            if text.is_empty() && state.draft.is_empty() {
                return Err(ClientError::EmptyNote);
            }
            (state.owner()?, text, state.draft.clone())
        };

        self.set_status(SyncStatus::Syncing("Saving note...".to_string()));
        let id = self.docs.generate_id();

        let image = match &draft.image {
            Some(image) => Some(
                self.store_media(
                    MediaKind::Image,
                    image_path(&owner, &id, &image.extension()),
                    image.content_type(),
                    image.data(),
                )
                .await,
            ),
            None => None,
        };
        let voice = match &draft.voice {
            Some(voice) => Some(
                self.store_media(
                    MediaKind::Voice,
                    voice_path(&owner, &id),
                    voice.content_type(),
                    voice.data(),
                )
                .await,
            ),
            None => None,
        };

        let written = match NoteWrite::new(id, text.clone(), image, voice) {
            Ok(write) => self
                .docs
                .set_note(&owner, write)
                .await
                .map_err(ClientError::from),
            Err(e) => Err(ClientError::from(e)),
        };

        match written {
            Ok(note) => {
                // Input staged while the save was in flight belongs to the next note.
                let mut state = self.state.lock().await;
                if state.draft.image == draft.image {
                    state.draft.image = None;
                }
                if state.draft.voice == draft.voice {
                    state.draft.voice = None;
                }
                if state.text.trim() == text {
                    state.text.clear();
                }
                drop(state);
                tracing::info!(note_id = %note.id, types = ?note.content_types(), "Note saved");
                self.flash_success("Note saved successfully!");
                Ok(note)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to save note");
                self.set_status(SyncStatus::Offline(format!("Error saving note: {e}")));
                Err(e)
            }
        }
    }

    /// Upload a payload, falling back to an inline data URL if the upload fails.
    async fn store_media(
        &self,
        kind: MediaKind,
        path: String,
        content_type: &str,
        data: &Bytes,
    ) -> MediaRef {
        match self.blobs.upload(&path, data.clone()).await {
            Ok(url) => MediaRef::Remote { url, path },
            Err(e) => {
                tracing::warn!(
                    kind = %kind,
                    path = %path,
                    error = %e,
                    "Upload failed, storing media inline"
                );
                MediaRef::Inline {
                    data_url: encode_inline(content_type, data),
                }
            }
        }
    }

    /// Delete a note and, best-effort, its uploaded media.
    pub async fn delete_note(&self, id: &NoteId) -> ClientResult<()> {
        let owner = self.owner().await?;
        self.set_status(SyncStatus::Syncing("Deleting note...".to_string()));

        let note = self.notes().iter().find(|n| n.id == *id).cloned();
        match self.delete_with_media(&owner, id, note.as_ref()).await {
            Ok(()) => {
                self.set_status(SyncStatus::connected());
                Ok(())
            }
            Err(e) => {
                self.set_status(SyncStatus::Offline(format!("Error deleting note: {e}")));
                Err(e)
            }
        }
    }

    async fn delete_with_media(
        &self,
        owner: &UserId,
        id: &NoteId,
        note: Option<&Note>,
    ) -> ClientResult<()> {
        if let Some(note) = note {
            for (kind, path) in note.blob_paths() {
                if let Err(e) = self.blobs.delete(path).await {
                    tracing::debug!(
                        note_id = %id,
                        kind = %kind,
                        path = %path,
                        error = %e,
                        "Ignoring blob delete failure"
                    );
                }
            }
        }
        self.docs.delete_note(owner, id).await?;
        Ok(())
    }

    /// Pin or unpin a note. Only the pinned field is written.
    pub async fn toggle_pin(&self, id: &NoteId, pinned: bool) -> ClientResult<Note> {
        let owner = self.owner().await?;
        self.set_status(SyncStatus::Syncing("Updating note...".to_string()));
        match self
            .docs
            .merge_note(&owner, id, NotePatch::pinned(pinned))
            .await
        {
            Ok(note) => {
                self.set_status(SyncStatus::connected());
                Ok(note)
            }
            Err(e) => {
                self.set_status(SyncStatus::Offline(format!("Error updating note: {e}")));
                Err(e.into())
            }
        }
    }

    /// Delete every note in the view concurrently.
    ///
    /// Returns `None` without touching anything unless `confirmed`.
    pub async fn clear_all(&self, confirmed: bool) -> ClientResult<Option<ClearReport>> {
        if !confirmed {
            return Ok(None);
        }
        let owner = self.owner().await?;
        let notes = self.notes();
        if notes.is_empty() {
            return Ok(Some(ClearReport::default()));
        }

        self.set_status(SyncStatus::Syncing("Deleting all notes...".to_string()));
        let owner = &owner;
        let results = join_all(notes.iter().map(|note| async move {
            let result = self.delete_with_media(owner, &note.id, Some(note)).await;
            (note.id.clone(), result)
        }))
        .await;

        let mut report = ClearReport::default();
        for (id, result) in results {
            match result {
                Ok(()) => report.deleted += 1,
                Err(e) => {
                    tracing::warn!(note_id = %id, error = %e, "Failed to delete note during clear");
                    report.failed.push((id, e.to_string()));
                }
            }
        }

        if report.is_complete() {
            self.set_status(SyncStatus::connected());
        } else {
            self.set_status(SyncStatus::Offline("Error clearing notes".to_string()));
        }
        Ok(Some(report))
    }

    // ---------------------------------------------------------------------
    // Dispatch
    // ---------------------------------------------------------------------

    /// Handle a user action.
    pub async fn dispatch(&self, command: Command) -> ClientResult<Outcome> {
        Ok(match command {
            Command::SignIn => Outcome::SignedIn(self.sign_in().await?),
            Command::SignOut => {
                self.sign_out().await?;
                Outcome::SignedOut
            }
            Command::SetText(text) => {
                self.set_text(text).await;
                Outcome::Done
            }
            Command::StageImage {
                data,
                file_name,
                content_type,
            } => {
                self.stage_image(data, file_name, content_type).await?;
                Outcome::Done
            }
            Command::RemoveImage => {
                self.remove_image().await;
                Outcome::Done
            }
            Command::RemoveVoice => {
                self.remove_voice().await;
                Outcome::Done
            }
            Command::ClearMedia => {
                self.clear_media().await;
                Outcome::Done
            }
            Command::ToggleRecording => match self.toggle_recording().await? {
                RecorderEvent::Started => Outcome::RecordingStarted,
                RecorderEvent::Stopped(_) => Outcome::VoiceStaged,
                RecorderEvent::Ignored => Outcome::Ignored,
            },
            Command::AddNote => Outcome::NoteAdded(self.add_note().await?),
            Command::DeleteNote(id) => {
                self.delete_note(&id).await?;
                Outcome::NoteDeleted(id)
            }
            Command::TogglePin(id, pinned) => {
                Outcome::NoteUpdated(self.toggle_pin(&id, pinned).await?)
            }
            Command::ClearAll { confirmed } => match self.clear_all(confirmed).await? {
                Some(report) => Outcome::Cleared(report),
                None => Outcome::Cancelled,
            },
            Command::Search(query) => Outcome::Filtered(self.search(query).await),
        })
    }
}
