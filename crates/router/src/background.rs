//! Tracking for fire-and-forget cache writes.

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Registry of spawned background writes so they can be awaited on demand.
#[derive(Default)]
pub(crate) struct BackgroundWrites {
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl BackgroundWrites {
    /// Register a spawned write, dropping handles of writes that already finished.
    pub(crate) async fn register(&self, handle: JoinHandle<()>) {
        let mut tasks = self.tasks.lock().await;
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle);
    }

    /// Wait for every write registered so far.
    pub(crate) async fn flush(&self) {
        let handles = std::mem::take(&mut *self.tasks.lock().await);
        for handle in handles {
            if let Err(join_err) = handle.await
                && join_err.is_panic()
            {
                tracing::error!(error = %join_err, "Background cache write panicked");
            }
        }
    }

    pub(crate) async fn pending(&self) -> usize {
        self.tasks
            .lock()
            .await
            .iter()
            .filter(|task| !task.is_finished())
            .count()
    }
}
