//! Document store trait and the SQLite implementation.

use crate::error::{DocStoreError, DocStoreResult};
use crate::models::{NoteRow, media_columns};
use crate::repos::NoteRepo;
use crate::subscription::{NoteSubscription, Snapshot};
use async_trait::async_trait;
use jotpad_core::{Note, NoteId, NotePatch, NoteWrite, UserId};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::{Mutex, watch};

/// Combined document store trait.
#[async_trait]
pub trait DocumentStore: NoteRepo + Send + Sync {
    /// Run database migrations.
    async fn migrate(&self) -> DocStoreResult<()>;

    /// Subscribe to full snapshots of an owner's collection.
    async fn subscribe(&self, owner: &UserId) -> DocStoreResult<NoteSubscription>;

    /// Check database connectivity and health.
    async fn health_check(&self) -> DocStoreResult<()>;
}

/// SQLite-based document store.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
    /// One snapshot channel per owner with live subscribers.
    channels: Mutex<HashMap<UserId, watch::Sender<Snapshot>>>,
}

impl SqliteStore {
    /// Open (or create) a database file.
    pub async fn new(path: impl AsRef<Path>) -> DocStoreResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5));

        // A single connection serializes writers; SQLite has one writer anyway.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await?;

        Self::with_pool(pool).await
    }

    /// Create a private in-memory database, lost when the store is dropped.
    pub async fn in_memory() -> DocStoreResult<Self> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")?;

        // The database lives as long as its only connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: Pool<Sqlite>) -> DocStoreResult<Self> {
        let store = Self {
            pool,
            channels: Mutex::new(HashMap::new()),
        };
        store.migrate().await?;
        Ok(store)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Push a fresh snapshot to the owner's subscribers, if any.
    ///
    /// The write that triggered the publish has already committed, so a failed
    /// reload is logged rather than returned.
    async fn publish(&self, owner: &UserId) {
        let mut channels = self.channels.lock().await;
        let Some(sender) = channels.get(owner) else {
            return;
        };
        if sender.receiver_count() == 0 {
            channels.remove(owner);
            return;
        }

        match self.list_notes(owner).await {
            Ok(notes) => {
                sender.send_replace(Arc::new(notes));
            }
            Err(e) => {
                tracing::warn!(owner = %owner, error = %e, "Failed to reload snapshot for subscribers");
            }
        }
    }

    async fn fetch_row(&self, owner: &UserId, id: &NoteId) -> DocStoreResult<Option<NoteRow>> {
        let row = sqlx::query_as::<_, NoteRow>(
            "SELECT * FROM notes WHERE owner_uid = ? AND note_id = ?",
        )
        .bind(owner.as_str())
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}

#[async_trait]
impl NoteRepo for SqliteStore {
    fn generate_id(&self) -> NoteId {
        NoteId::generate()
    }

    async fn set_note(&self, owner: &UserId, write: NoteWrite) -> DocStoreResult<Note> {
        let note = write.into_note(OffsetDateTime::now_utc());
        if !note.has_content() {
            return Err(jotpad_core::Error::EmptyNote.into());
        }
        let (image_url, image_path, image_data) = media_columns(note.image.as_ref());
        let (voice_url, voice_path, voice_data) = media_columns(note.voice.as_ref());

        sqlx::query(
            r#"
            INSERT INTO notes (
                owner_uid, note_id, text,
                image_url, image_path, image_data,
                voice_url, voice_path, voice_data,
                pinned, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(owner_uid, note_id) DO UPDATE SET
                text = excluded.text,
                image_url = excluded.image_url,
                image_path = excluded.image_path,
                image_data = excluded.image_data,
                voice_url = excluded.voice_url,
                voice_path = excluded.voice_path,
                voice_data = excluded.voice_data,
                pinned = excluded.pinned,
                created_at = excluded.created_at
            "#,
        )
        .bind(owner.as_str())
        .bind(note.id.as_str())
        .bind(&note.text)
        .bind(image_url)
        .bind(image_path)
        .bind(image_data)
        .bind(voice_url)
        .bind(voice_path)
        .bind(voice_data)
        .bind(note.pinned)
        .bind(note.created_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(owner = %owner, note_id = %note.id, "Note written");
        self.publish(owner).await;
        Ok(note)
    }

    async fn merge_note(
        &self,
        owner: &UserId,
        id: &NoteId,
        patch: NotePatch,
    ) -> DocStoreResult<Note> {
        if let Some(pinned) = patch.pinned {
            let result =
                sqlx::query("UPDATE notes SET pinned = ? WHERE owner_uid = ? AND note_id = ?")
                    .bind(pinned)
                    .bind(owner.as_str())
                    .bind(id.as_str())
                    .execute(&self.pool)
                    .await?;

            if result.rows_affected() == 0 {
                return Err(DocStoreError::NotFound(format!("note {id}")));
            }
        }

        let row = self
            .fetch_row(owner, id)
            .await?
            .ok_or_else(|| DocStoreError::NotFound(format!("note {id}")))?;

        if !patch.is_empty() {
            self.publish(owner).await;
        }
        Note::try_from(row)
    }

    async fn delete_note(&self, owner: &UserId, id: &NoteId) -> DocStoreResult<()> {
        let result = sqlx::query("DELETE FROM notes WHERE owner_uid = ? AND note_id = ?")
            .bind(owner.as_str())
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            tracing::debug!(owner = %owner, note_id = %id, "Note deleted");
            self.publish(owner).await;
        }
        Ok(())
    }

    async fn get_note(&self, owner: &UserId, id: &NoteId) -> DocStoreResult<Option<Note>> {
        self.fetch_row(owner, id)
            .await?
            .map(Note::try_from)
            .transpose()
    }

    async fn list_notes(&self, owner: &UserId) -> DocStoreResult<Vec<Note>> {
        let rows = sqlx::query_as::<_, NoteRow>(
            "SELECT * FROM notes WHERE owner_uid = ? ORDER BY created_at, note_id",
        )
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Note::try_from).collect()
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn migrate(&self) -> DocStoreResult<()> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    async fn subscribe(&self, owner: &UserId) -> DocStoreResult<NoteSubscription> {
        // The lock is held while loading so no publish can slip in between the
        // initial snapshot and the receiver being registered.
        let mut channels = self.channels.lock().await;
        if let Some(sender) = channels.get(owner) {
            return Ok(NoteSubscription::new(sender.subscribe()));
        }

        let notes = self.list_notes(owner).await?;
        let (sender, rx) = watch::channel(Arc::new(notes));
        channels.insert(owner.clone(), sender);
        tracing::debug!(owner = %owner, "Opened snapshot channel");
        Ok(NoteSubscription::new(rx))
    }

    async fn health_check(&self) -> DocStoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// SQL schema for SQLite.
const SCHEMA_SQL: &str = r#"
-- One row per note; each medium is either remote (url + path) or inline (data).
CREATE TABLE IF NOT EXISTS notes (
    owner_uid TEXT NOT NULL,
    note_id TEXT NOT NULL,
    text TEXT NOT NULL DEFAULT '',
    image_url TEXT,
    image_path TEXT,
    image_data TEXT,
    voice_url TEXT,
    voice_path TEXT,
    voice_data TEXT,
    pinned INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    PRIMARY KEY (owner_uid, note_id),
    CHECK (image_url IS NULL OR image_data IS NULL),
    CHECK (voice_url IS NULL OR voice_data IS NULL)
);
CREATE INDEX IF NOT EXISTS idx_notes_owner_created ON notes(owner_uid, created_at);
"#;
