//! Offline-first repositories.
//!
//! Reads are local-only and reactive; writes land in SQLite with the
//! dirty flag set, then request a deduplicated sync enqueue. Only the
//! sync worker ever clears the flag: after a confirmed remote write, or
//! after a fresh remote pull.

mod habit_repo;
mod note_repo;
mod task_repo;
mod transaction_repo;

pub use habit_repo::HabitRepository;
pub use note_repo::NoteRepository;
pub use task_repo::TaskRepository;
pub use transaction_repo::TransactionRepository;

use uuid::Uuid;

use crate::remote::RemoteError;

/// Errors surfaced by repository operations.
#[derive(Debug)]
pub enum RepoError {
    /// Local storage failure
    Database(sqlx::Error),
    /// Remote store failure
    Remote(RemoteError),
    /// A remote document did not match the entity shape
    Document(serde_json::Error),
    /// Entity not found locally
    NotFound(Uuid),
}

impl std::fmt::Display for RepoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepoError::Database(e) => write!(f, "Database error: {}", e),
            RepoError::Remote(e) => write!(f, "Remote error: {}", e),
            RepoError::Document(e) => write!(f, "Document error: {}", e),
            RepoError::NotFound(id) => write!(f, "Not found: {}", id),
        }
    }
}

impl std::error::Error for RepoError {}

impl From<sqlx::Error> for RepoError {
    fn from(e: sqlx::Error) -> Self {
        RepoError::Database(e)
    }
}

impl From<RemoteError> for RepoError {
    fn from(e: RemoteError) -> Self {
        RepoError::Remote(e)
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(e: serde_json::Error) -> Self {
        RepoError::Document(e)
    }
}
