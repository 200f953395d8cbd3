//! Remote document store access.
//!
//! The cloud mirror is a per-user document collection laid out as
//! `users/{uid}/{collection}/{entity_id}`; documents carry the local row
//! fields minus the `is_synced` flag. All access goes through the
//! [`RemoteStore`] trait so repositories and the sync worker can be
//! exercised against an in-memory double.

mod http;
#[cfg(test)]
pub mod memory;

pub use http::{check_server, HttpRemoteStore};

use serde_json::Value;
use std::future::Future;

/// Collection names mirroring the local tables.
pub const TASKS: &str = "tasks";
pub const NOTES: &str = "notes";
pub const HABITS: &str = "habits";
pub const TRANSACTIONS: &str = "transactions";

/// Errors that can occur talking to the remote store.
#[derive(Debug)]
pub enum RemoteError {
    /// No authenticated user; short-circuits any remote operation.
    NoUser,
    /// Remote access is not configured
    NotConfigured,
    /// Transport-level failure
    Http(String),
    /// Server answered with a non-success status
    Status(u16, String),
    /// Response body could not be decoded
    Decode(String),
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemoteError::NoUser => write!(f, "No authenticated user"),
            RemoteError::NotConfigured => write!(
                f,
                "Remote not configured. Add server_url and api_key to config."
            ),
            RemoteError::Http(e) => write!(f, "HTTP error: {}", e),
            RemoteError::Status(code, url) => {
                write!(f, "Server returned {} for {}", code, url)
            }
            RemoteError::Decode(e) => write!(f, "Failed to decode response: {}", e),
        }
    }
}

impl std::error::Error for RemoteError {}

/// Per-user document store operations.
///
/// `put` is a full overwrite by id; there is no merge or partial update.
pub trait RemoteStore: Send + Sync {
    fn put(
        &self,
        collection: &str,
        id: &str,
        doc: Value,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    fn delete(
        &self,
        collection: &str,
        id: &str,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    fn fetch_all(
        &self,
        collection: &str,
    ) -> impl Future<Output = Result<Vec<Value>, RemoteError>> + Send;
}
