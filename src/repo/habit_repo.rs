use chrono::Utc;
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

use super::RepoError;
use crate::db::HabitStore;
use crate::models::Habit;
use crate::remote::{RemoteStore, HABITS};
use crate::sync::SyncHandle;

pub struct HabitRepository<R: RemoteStore> {
    store: HabitStore,
    remote: Arc<R>,
    sync: SyncHandle,
    watch_tx: watch::Sender<Vec<Habit>>,
}

impl<R: RemoteStore + 'static> HabitRepository<R> {
    pub fn new(store: HabitStore, remote: Arc<R>, sync: SyncHandle) -> Self {
        let (watch_tx, _) = watch::channel(Vec::new());
        Self {
            store,
            remote,
            sync,
            watch_tx,
        }
    }

    pub fn observe(&self) -> watch::Receiver<Vec<Habit>> {
        self.watch_tx.subscribe()
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Habit>, RepoError> {
        Ok(self.store.get(id).await?)
    }

    pub async fn list(&self) -> Result<Vec<Habit>, RepoError> {
        Ok(self.store.list().await?)
    }

    pub async fn add(&self, habit: &Habit) -> Result<(), RepoError> {
        self.write_dirty(habit).await
    }

    pub async fn update(&self, habit: &Habit) -> Result<(), RepoError> {
        self.write_dirty(habit).await
    }

    /// Stamps a completion for right now on the habit's history.
    pub async fn check_in(&self, id: Uuid) -> Result<Habit, RepoError> {
        let mut habit = self.store.get(id).await?.ok_or(RepoError::NotFound(id))?;
        habit.completed_dates.push(Utc::now());
        self.write_dirty(&habit).await?;
        Ok(habit)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store.delete(id).await?;
        self.publish().await?;

        let remote = Arc::clone(&self.remote);
        tokio::spawn(async move {
            if let Err(e) = remote.delete(HABITS, &id.to_string()).await {
                tracing::warn!("Failed to delete remote habit {}: {}", id, e);
            }
        });

        Ok(())
    }

    pub async fn sync_pending_changes(&self) -> Result<(), RepoError> {
        let pending = self.store.unsynced().await?;
        if pending.is_empty() {
            return Ok(());
        }

        for habit in &pending {
            let doc = serde_json::to_value(habit)?;
            self.remote.put(HABITS, &habit.id.to_string(), doc).await?;
            self.store.mark_synced(habit.id).await?;
        }

        tracing::debug!("Synced {} habit(s)", pending.len());
        self.publish().await
    }

    pub async fn refresh_from_remote(&self) -> Result<(), RepoError> {
        let docs = self.remote.fetch_all(HABITS).await?;
        let count = docs.len();

        for doc in docs {
            let habit: Habit = serde_json::from_value(doc)?;
            self.store.apply_remote(&habit).await?;
        }

        tracing::debug!("Refreshed {} habit(s) from remote", count);
        self.publish().await
    }

    async fn write_dirty(&self, habit: &Habit) -> Result<(), RepoError> {
        let mut dirty = habit.clone();
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
