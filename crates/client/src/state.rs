//! Owned client state.

use crate::auth::User;
use crate::error::{ClientError, ClientResult};
use jotpad_core::{MediaDraft, UserId};
use tokio::task::JoinHandle;

/// A signed-in session and its live subscription.
pub(crate) struct Session {
    pub(crate) user: User,
    /// Task feeding collection snapshots into the view.
    pub(crate) pump: JoinHandle<()>,
}

/// Everything the client owns between sign-in and sign-out.
#[derive(Default)]
pub(crate) struct AppState {
    pub(crate) session: Option<Session>,
    pub(crate) draft: MediaDraft,
    pub(crate) text: String,
    pub(crate) query: String,
}

impl AppState {
    pub(crate) fn owner(&self) -> ClientResult<UserId> {
        self.session
            .as_ref()
            .map(|s| s.user.uid.clone())
            .ok_or(ClientError::NotSignedIn)
    }

    /// Drop all per-user input.
    pub(crate) fn reset_input(&mut self) {
        self.draft.clear();
        self.text.clear();
        self.query.clear();
    }
}
