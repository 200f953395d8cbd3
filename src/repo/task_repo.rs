use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

use super::RepoError;
use crate::db::TaskStore;
use crate::models::Task;
use crate::remote::{RemoteStore, TASKS};
use crate::sync::SyncHandle;

/// Offline-first task repository.
///
/// Reads never touch the network; writes are local plus a sync request.
pub struct TaskRepository<R: RemoteStore> {
    store: TaskStore,
    remote: Arc<R>,
    sync: SyncHandle,
    watch_tx: watch::Sender<Vec<Task>>,
}

impl<R: RemoteStore + 'static> TaskRepository<R> {
    pub fn new(store: TaskStore, remote: Arc<R>, sync: SyncHandle) -> Self {
        let (watch_tx, _) = watch::channel(Vec::new());
        Self {
            store,
            remote,
            sync,
            watch_tx,
        }
    }

    /// Reactive local-only stream; receives the full task list after
    /// every local change.
    pub fn observe(&self) -> watch::Receiver<Vec<Task>> {
        self.watch_tx.subscribe()
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Task>, RepoError> {
        Ok(self.store.get(id).await?)
    }

    pub async fn list(&self) -> Result<Vec<Task>, RepoError> {
        Ok(self.store.list().await?)
    }

    pub async fn add(&self, task: &Task) -> Result<(), RepoError> {
        self.write_dirty(task).await
    }

    pub async fn update(&self, task: &Task) -> Result<(), RepoError> {
        self.write_dirty(task).await
    }

    pub async fn toggle_completion(&self, id: Uuid) -> Result<(), RepoError> {
        let mut task = self.store.get(id).await?.ok_or(RepoError::NotFound(id))?;
        task.is_completed = !task.is_completed;
        self.write_dirty(&task).await
    }

    /// Removes the task locally right away and fires an unawaited remote
    /// delete. When that delete fails it is logged and never retried, so
    /// a remote copy can outlive its local deletion.
    pub async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store.delete(id).await?;
        self.publish().await?;

        let remote = Arc::clone(&self.remote);
        tokio::spawn(async move {
            if let Err(e) = remote.delete(TASKS, &id.to_string()).await {
                tracing::warn!("Failed to delete remote task {}: {}", id, e);
            }
        });

        Ok(())
    }

    /// Pushes every dirty row, marking each clean on individual success.
    /// The first failure aborts the batch; rows pushed before it stay
    /// clean, the rest stay dirty for the next run.
    pub async fn sync_pending_changes(&self) -> Result<(), RepoError> {
        let pending = self.store.unsynced().await?;
        if pending.is_empty() {
            return Ok(());
        }

        for task in &pending {
            let doc = serde_json::to_value(task)?;
            self.remote.put(TASKS, &task.id.to_string(), doc).await?;
            self.store.mark_synced(task.id).await?;
        }

        tracing::debug!("Synced {} task(s)", pending.len());
        self.publish().await
    }

    /// Pulls the whole remote collection and overwrites matching local
    /// rows as clean. Concurrent local edits are last-write-wins.
    pub async fn refresh_from_remote(&self) -> Result<(), RepoError> {
        let docs = self.remote.fetch_all(TASKS).await?;
        let count = docs.len();

        for doc in docs {
            let task: Task = serde_json::from_value(doc)?;
            self.store.apply_remote(&task).await?;
        }

        tracing::debug!("Refreshed {} task(s) from remote", count);
        self.publish().await
    }

    async fn write_dirty(&self, task: &Task) -> Result<(), RepoError> {
        let mut dirty = task.clone();
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::models::Priority;
    use crate::remote::memory::MemoryRemote;
    use crate::sync::sync_channel;

    async fn setup() -> (TaskRepository<MemoryRemote>, Arc<MemoryRemote>, tempfile::TempDir) {
        let (pool, dir) = test_pool().await;
        let remote = Arc::new(MemoryRemote::new());
        let (handle, _rx) = sync_channel();
        let repo = TaskRepository::new(TaskStore::new(pool), Arc::clone(&remote), handle);
        (repo, remote, dir)
    }

    #[tokio::test]
    async fn test_add_stores_dirty_locally() {
        let (repo, remote, _dir) = setup().await;

        let mut task = Task::new("Buy milk");
        task.is_synced = true; // repository must re-stamp it dirty
        repo.add(&task).await.unwrap();

        let fetched = repo.get(task.id).await.unwrap().unwrap();
        assert!(!fetched.is_synced);
        // Nothing reaches the remote until a sync runs.
        assert_eq!(remote.collection_len(TASKS), 0);
    }

    #[tokio::test]
    async fn test_sync_pending_changes_marks_clean_and_mirrors_fields() {
        let (repo, remote, _dir) = setup().await;

        let task = Task::new("Buy milk").with_priority(Priority::High);
        repo.add(&task).await.unwrap();
        repo.sync_pending_changes().await.unwrap();

        let local = repo.get(task.id).await.unwrap().unwrap();
        assert!(local.is_synced);

        let doc = remote.doc(TASKS, &task.id.to_string()).unwrap();
        let mirrored = serde_json::to_value(&local).unwrap();
        assert_eq!(doc, mirrored);
        assert!(doc.get("is_synced").is_none());
    }

    #[tokio::test]
    async fn test_sync_failure_aborts_batch_after_completed_rows() {
        let (repo, remote, _dir) = setup().await;

        let first = Task::new("first");
        repo.add(&first).await.unwrap();
        // Ensure deterministic push order (oldest first).
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = Task::new("second");
        repo.add(&second).await.unwrap();

        remote.fail_put_for(&second.id.to_string());
        let err = repo.sync_pending_changes().await.unwrap_err();
        assert!(matches!(err, RepoError::Remote(_)));

        // Whatever completed before the failure stays clean.
        assert!(repo.get(first.id).await.unwrap().unwrap().is_synced);
        assert!(!repo.get(second.id).await.unwrap().unwrap().is_synced);
    }

    #[tokio::test]
    async fn test_refresh_from_remote_returns_exact_remote_set_clean() {
        let (repo, remote, _dir) = setup().await;

        let a = Task::new("remote a");
        let b = Task::new("remote b");
        remote.insert_doc(TASKS, &a.id.to_string(), serde_json::to_value(&a).unwrap());
        remote.insert_doc(TASKS, &b.id.to_string(), serde_json::to_value(&b).unwrap());

        repo.refresh_from_remote().await.unwrap();

        let local = repo.list().await.unwrap();
        assert_eq!(local.len(), 2);
        assert!(local.iter().all(|t| t.is_synced));
        let mut ids: Vec<Uuid> = local.iter().map(|t| t.id).collect();
        ids.sort();
        let mut expected = vec![a.id, b.id];
        expected.sort();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn test_refresh_overwrites_local_rows_last_write_wins() {
        let (repo, remote, _dir) = setup().await;

        let mut task = Task::new("local title");
        repo.add(&task).await.unwrap();

        task.title = "remote title".to_string();
        remote.insert_doc(TASKS, &task.id.to_string(), serde_json::to_value(&task).unwrap());

        repo.refresh_from_remote().await.unwrap();

        let local = repo.get(task.id).await.unwrap().unwrap();
        assert_eq!(local.title, "remote title");
        assert!(local.is_synced);
    }

    #[tokio::test]
    async fn test_delete_is_local_first_even_when_remote_is_down() {
        let (repo, remote, _dir) = setup().await;

        let task = Task::new("doomed");
        repo.add(&task).await.unwrap();

        remote.set_offline(true);
        repo.delete(task.id).await.unwrap();

        // Gone locally immediately, regardless of the remote outcome.
        assert!(repo.get(task.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_requests_remote_delete_best_effort() {
        let (repo, remote, _dir) = setup().await;

        let task = Task::new("doomed");
        repo.add(&task).await.unwrap();
        repo.sync_pending_changes().await.unwrap();

        repo.delete(task.id).await.unwrap();

        // The remote delete is fire-and-forget; give the spawned task a
        // moment to land.
        for _ in 0..50 {
            if remote.doc(TASKS, &task.id.to_string()).is_none() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert!(remote.doc(TASKS, &task.id.to_string()).is_none());
        assert!(remote
            .deleted()
            .contains(&(TASKS.to_string(), task.id.to_string())));
    }

    #[tokio::test]
    async fn test_concurrent_adds_with_distinct_ids_never_lose_rows() {
        let (repo, _remote, _dir) = setup().await;
        let repo = Arc::new(repo);

        let mut handles = Vec::new();
        for i in 0..10 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                repo.add(&Task::new(format!("task {}", i))).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(repo.list().await.unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_toggle_completion_restamps_dirty() {
        let (repo, _remote, _dir) = setup().await;

        let task = Task::new("flip me");
        repo.add(&task).await.unwrap();
        repo.sync_pending_changes().await.unwrap();

        repo.toggle_completion(task.id).await.unwrap();
        let fetched = repo.get(task.id).await.unwrap().unwrap();
        assert!(fetched.is_completed);
        assert!(!fetched.is_synced);

        let missing = Uuid::new_v4();
        assert!(matches!(
            repo.toggle_completion(missing).await,
            Err(RepoError::NotFound(id)) if id == missing
        ));
    }

    #[tokio::test]
    async fn test_observe_pushes_on_change() {
        let (repo, _remote, _dir) = setup().await;
        let mut rx = repo.observe();

        let task = Task::new("watched");
        repo.add(&task).await.unwrap();

        rx.changed().await.unwrap();
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, task.id);
    }
}
