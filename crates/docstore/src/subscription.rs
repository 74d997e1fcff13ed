//! Live, full-snapshot subscriptions to a note collection.

use futures::Stream;
use jotpad_core::Note;
use std::sync::Arc;
use tokio::sync::watch;

/// A complete, unordered copy of an owner's collection.
pub type Snapshot = Arc<Vec<Note>>;

/// Receiver side of a collection subscription.
///
/// The first call to [`next`](Self::next) yields the collection as it was when
/// the subscription was created; later calls wait for the next change. A slow
/// consumer skips intermediate snapshots and only sees the latest one.
/// Dropping the subscription unsubscribes.
pub struct NoteSubscription {
    rx: watch::Receiver<Snapshot>,
    primed: bool,
}

impl NoteSubscription {
    pub(crate) fn new(rx: watch::Receiver<Snapshot>) -> Self {
        Self { rx, primed: false }
    }

    /// Wait for the next snapshot. Returns `None` once the store is gone.
    pub async fn next(&mut self) -> Option<Snapshot> {
        if !self.primed {
            self.primed = true;
            return Some(self.rx.borrow_and_update().clone());
        }
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Latest snapshot without waiting.
    pub fn current(&self) -> Snapshot {
        self.rx.borrow().clone()
    }

    pub fn into_stream(mut self) -> impl Stream<Item = Snapshot> + Send + 'static {
        async_stream::stream! {
            while let Some(snapshot) = self.next().await {
                yield snapshot;
            }
        }
    }
}

impl std::fmt::Debug for NoteSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteSubscription")
            .field("notes", &self.rx.borrow().len())
            .field("primed", &self.primed)
            .finish()
    }
}
