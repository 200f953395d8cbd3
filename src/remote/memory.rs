//! In-memory [`RemoteStore`] double for tests.

use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::{RemoteError, RemoteStore};

/// Fake document store keyed by (collection, id), with switchable
/// failure injection.
#[derive(Default)]
pub struct MemoryRemote {
    docs: Mutex<BTreeMap<(String, String), Value>>,
    // When set, every operation fails as if the network were down.
    offline: AtomicBool,
    fail_put_ids: Mutex<HashSet<String>>,
    deletes: Mutex<Vec<(String, String)>>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Makes `put` fail for one specific document id.
    pub fn fail_put_for(&self, id: &str) {
        self.fail_put_ids.lock().unwrap().insert(id.to_string());
    }

    pub fn insert_doc(&self, collection: &str, id: &str, doc: Value) {
        self.docs
            .lock()
            .unwrap()
            .insert((collection.to_string(), id.to_string()), doc);
    }

    pub fn doc(&self, collection: &str, id: &str) -> Option<Value> {
        self.docs
            .lock()
            .unwrap()
            .get(&(collection.to_string(), id.to_string()))
            .cloned()
    }

    pub fn collection_len(&self, collection: &str) -> usize {
        self.docs
            .lock()
            .unwrap()
            .keys()
            .filter(|(c, _)| c == collection)
            .count()
    }

    /// All (collection, id) pairs deleted so far, in order.
    pub fn deleted(&self) -> Vec<(String, String)> {
        self.deletes.lock().unwrap().clone()
    }

    fn check_online(&self) -> Result<(), RemoteError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(RemoteError::Http("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

impl RemoteStore for MemoryRemote {
    async fn put(&self, collection: &str, id: &str, doc: Value) -> Result<(), RemoteError> {
        self.check_online()?;
        if self.fail_put_ids.lock().unwrap().contains(id) {
            return Err(RemoteError::Status(500, format!("{}/{}", collection, id)));
        }
        self.insert_doc(collection, id, doc);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), RemoteError> {
        self.check_online()?;
        self.docs
            .lock()
            .unwrap()
            .remove(&(collection.to_string(), id.to_string()));
        self.deletes
            .lock()
            .unwrap()
            .push((collection.to_string(), id.to_string()));
        Ok(())
    }

    async fn fetch_all(&self, collection: &str) -> Result<Vec<Value>, RemoteError> {
        self.check_online()?;
        Ok(self
            .docs
            .lock()
            .unwrap()
            .iter()
            .filter(|((c, _), _)| c == collection)
            .map(|(_, doc)| doc.clone())
            .collect())
    }
}
