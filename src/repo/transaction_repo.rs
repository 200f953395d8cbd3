use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

use super::RepoError;
use crate::db::TransactionStore;
use crate::models::{Transaction, TransactionKind};
use crate::remote::{RemoteStore, TRANSACTIONS};
use crate::sync::SyncHandle;

pub struct TransactionRepository<R: RemoteStore> {
    store: TransactionStore,
    remote: Arc<R>,
    sync: SyncHandle,
    watch_tx: watch::Sender<Vec<Transaction>>,
}

impl<R: RemoteStore + 'static> TransactionRepository<R> {
    pub fn new(store: TransactionStore, remote: Arc<R>, sync: SyncHandle) -> Self {
        let (watch_tx, _) = watch::channel(Vec::new());
        Self {
            store,
            remote,
            sync,
            watch_tx,
        }
    }

    pub fn observe(&self) -> watch::Receiver<Vec<Transaction>> {
        self.watch_tx.subscribe()
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Transaction>, RepoError> {
        Ok(self.store.get(id).await?)
    }

    pub async fn list(&self) -> Result<Vec<Transaction>, RepoError> {
        Ok(self.store.list().await?)
    }

    /// Income minus expenses over the whole history.
    pub async fn balance(&self) -> Result<f64, RepoError> {
        let all = self.store.list().await?;
        Ok(all
            .iter()
            .map(|tx| match tx.kind {
                TransactionKind::Income => tx.amount,
                TransactionKind::Expense => -tx.amount,
            })
            .sum())
    }

    pub async fn add(&self, tx: &Transaction) -> Result<(), RepoError> {
        self.write_dirty(tx).await
    }

    pub async fn update(&self, tx: &Transaction) -> Result<(), RepoError> {
        self.write_dirty(tx).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store.delete(id).await?;
        self.publish().await?;

        let remote = Arc::clone(&self.remote);
        tokio::spawn(async move {
            if let Err(e) = remote.delete(TRANSACTIONS, &id.to_string()).await {
                tracing::warn!("Failed to delete remote transaction {}: {}", id, e);
            }
        });

        Ok(())
    }

    pub async fn sync_pending_changes(&self) -> Result<(), RepoError> {
        let pending = self.store.unsynced().await?;
        if pending.is_empty() {
            return Ok(());
        }

        for tx in &pending {
            let doc = serde_json::to_value(tx)?;
            self.remote.put(TRANSACTIONS, &tx.id.to_string(), doc).await?;
            self.store.mark_synced(tx.id).await?;
        }

        tracing::debug!("Synced {} transaction(s)", pending.len());
        self.publish().await
    }

    pub async fn refresh_from_remote(&self) -> Result<(), RepoError> {
        let docs = self.remote.fetch_all(TRANSACTIONS).await?;
        let count = docs.len();

        for doc in docs {
            let tx: Transaction = serde_json::from_value(doc)?;
            self.store.apply_remote(&tx).await?;
        }

        tracing::debug!("Refreshed {} transaction(s) from remote", count);
        self.publish().await
    }

    async fn write_dirty(&self, tx: &Transaction) -> Result<(), RepoError> {
        let mut dirty = tx.clone();
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
