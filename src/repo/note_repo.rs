use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

use super::RepoError;
use crate::db::NoteStore;
use crate::models::Note;
use crate::remote::{RemoteStore, NOTES};
use crate::sync::SyncHandle;

pub struct NoteRepository<R: RemoteStore> {
    store: NoteStore,
    remote: Arc<R>,
    sync: SyncHandle,
    watch_tx: watch::Sender<Vec<Note>>,
}

impl<R: RemoteStore + 'static> NoteRepository<R> {
    pub fn new(store: NoteStore, remote: Arc<R>, sync: SyncHandle) -> Self {
        let (watch_tx, _) = watch::channel(Vec::new());
        Self {
            store,
            remote,
            sync,
            watch_tx,
        }
    }

    pub fn observe(&self) -> watch::Receiver<Vec<Note>> {
        self.watch_tx.subscribe()
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Note>, RepoError> {
        Ok(self.store.get(id).await?)
    }

    pub async fn list(&self) -> Result<Vec<Note>, RepoError> {
        Ok(self.store.list().await?)
    }

    pub async fn add(&self, note: &Note) -> Result<(), RepoError> {
        self.write_dirty(note).await
    }

    pub async fn update(&self, note: &Note) -> Result<(), RepoError> {
        self.write_dirty(note).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store.delete(id).await?;
        self.publish().await?;

        let remote = Arc::clone(&self.remote);
        tokio::spawn(async move {
            if let Err(e) = remote.delete(NOTES, &id.to_string()).await {
                tracing::warn!("Failed to delete remote note {}: {}", id, e);
            }
        });

        Ok(())
    }

    pub async fn sync_pending_changes(&self) -> Result<(), RepoError> {
        let pending = self.store.unsynced().await?;
        if pending.is_empty() {
            return Ok(());
        }

        for note in &pending {
            let doc = serde_json::to_value(note)?;
            self.remote.put(NOTES, &note.id.to_string(), doc).await?;
            self.store.mark_synced(note.id).await?;
        }

        tracing::debug!("Synced {} note(s)", pending.len());
        self.publish().await
    }

    pub async fn refresh_from_remote(&self) -> Result<(), RepoError> {
        let docs = self.remote.fetch_all(NOTES).await?;
        let count = docs.len();

        for doc in docs {
            let note: Note = serde_json::from_value(doc)?;
            self.store.apply_remote(&note).await?;
        }

        tracing::debug!("Refreshed {} note(s) from remote", count);
        self.publish().await
    }

    async fn write_dirty(&self, note: &Note) -> Result<(), RepoError> {
        let mut dirty = note.clone();
        dirty.is_synced = false;
        self.store.upsert(&dirty).await?;
        self.publish().await?;
        self.sync.request();
        Ok(())
    }

    async fn publish(&self) -> Result<(), RepoError> {
        let all = self.store.list().await?;
        self.watch_tx.send_replace(all);
        Ok(())
    }
}
