use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{SyncOutcome, SyncWorker};
use crate::config::SyncConfig;
use crate::remote::{check_server, RemoteStore};

const BACKOFF_CAP: Duration = Duration::from_secs(600);

/// Enqueue handle handed to repositories.
///
/// The queue holds at most one pending job. A request while one is
/// queued is dropped (keep-existing policy); a running job is never
/// cancelled by a newer request.
#[derive(Clone)]
pub struct SyncHandle {
    tx: mpsc::Sender<()>,
}

impl SyncHandle {
    pub fn request(&self) {
        match self.tx.try_send(()) {
            Ok(()) => tracing::debug!("Sync enqueued"),
            Err(mpsc::error::TrySendError::Full(())) => {
                tracing::debug!("Sync already queued, keeping existing job")
            }
            Err(mpsc::error::TrySendError::Closed(())) => {
                tracing::warn!("Sync scheduler is not running")
            }
        }
    }
}

/// Creates the unique-job queue shared by the handle and the scheduler.
pub fn sync_channel() -> (SyncHandle, mpsc::Receiver<()>) {
    let (tx, rx) = mpsc::channel(1);
    (SyncHandle { tx }, rx)
}

/// Drives queued sync jobs, one at a time.
pub struct SyncScheduler;

impl SyncScheduler {
    /// Spawns the scheduler loop. `server_url`, when present, gates each
    /// run on the server being reachable.
    pub fn spawn<R: RemoteStore + 'static>(
        worker: Arc<SyncWorker<R>>,
        mut rx: mpsc::Receiver<()>,
        config: SyncConfig,
        server_url: Option<String>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            while rx.recv().await.is_some() {
                Self::run_job(&worker, &config, server_url.as_deref()).await;
            }
        })
    }

    /// Runs one job to completion, retrying a failed run with bounded
    /// exponential backoff. After the retry budget the job is dropped;
    /// the next local write enqueues a fresh one.
    async fn run_job<R: RemoteStore + 'static>(
        worker: &SyncWorker<R>,
        config: &SyncConfig,
        server_url: Option<&str>,
    ) {
        let mut backoff = Duration::from_secs(config.backoff_secs);

        for attempt in 0..=config.max_retries {
            if attempt > 0 {
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(BACKOFF_CAP);
            }

            if let Some(url) = server_url {
                if !check_server(url).await {
                    tracing::info!("Sync server unreachable, backing off");
                    continue;
                }
            }

            match worker.run().await {
                SyncOutcome::Completed => return,
                SyncOutcome::Retry => {
                    tracing::warn!("Sync attempt {} failed", attempt + 1);
                }
            }
        }

        tracing::warn!(
            "Sync gave up after {} attempt(s); will retry on the next local write",
            config.max_retries + 1
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{test_pool, HabitStore, NoteStore, TaskStore, TransactionStore};
    use crate::models::Task;
    use crate::remote::memory::MemoryRemote;
    use crate::repo::{HabitRepository, NoteRepository, TaskRepository, TransactionRepository};
    use crate::remote::TASKS;

    #[test]
    fn test_queue_keeps_existing_job() {
        let (handle, mut rx) = sync_channel();

        handle.request();
        handle.request(); // dropped, one already queued
        handle.request(); // dropped

        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_request_after_closed_scheduler_is_harmless() {
        let (handle, rx) = sync_channel();
        drop(rx);
        handle.request();
    }

    #[tokio::test]
    async fn test_scheduler_runs_queued_job_and_retries_to_success() {
        let (pool, _dir) = test_pool().await;
        let remote = Arc::new(MemoryRemote::new());
        let (handle, rx) = sync_channel();

        let tasks = Arc::new(TaskRepository::new(
            TaskStore::new(pool.clone()),
            Arc::clone(&remote),
            handle.clone(),
        ));
        let notes = Arc::new(NoteRepository::new(
            NoteStore::new(pool.clone()),
            Arc::clone(&remote),
            handle.clone(),
        ));
        let habits = Arc::new(HabitRepository::new(
            HabitStore::new(pool.clone()),
            Arc::clone(&remote),
            handle.clone(),
        ));
        let finance = Arc::new(TransactionRepository::new(
            TransactionStore::new(pool),
            Arc::clone(&remote),
            handle.clone(),
        ));

        let worker = Arc::new(SyncWorker::new(
            Arc::clone(&tasks),
            notes,
            habits,
            finance,
        ));

        let config = SyncConfig {
            max_retries: 5,
            backoff_secs: 0,
        };
        let join = SyncScheduler::spawn(worker, rx, config, None);

        // The first job burns its retry budget against a dead remote.
        remote.set_offline(true);
        let task = Task::new("queued while offline");
        tasks.add(&task).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        // Server comes back; a fresh request picks the dirty row up.
        remote.set_offline(false);
        handle.request();

        let mut synced = false;
        for _ in 0..100 {
            if remote.doc(TASKS, &task.id.to_string()).is_some() {
                synced = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(synced, "scheduler never pushed the dirty row");
        assert!(tasks.get(task.id).await.unwrap().unwrap().is_synced);

        drop(tasks);
        join.abort();
    }
}
