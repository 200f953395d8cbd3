//! Background synchronization.
//!
//! A single named job reconciles the local store with the cloud mirror:
//! an upload phase pushes every dirty row (one task per entity type, in
//! parallel), then a download phase pulls each remote collection and
//! overwrites local copies as clean. The scheduler keeps at most one job
//! queued; a running job is never cancelled by a newer request.

mod scheduler;
mod worker;

pub use scheduler::{sync_channel, SyncHandle, SyncScheduler};
pub use worker::{SyncOutcome, SyncWorker};
