//! Offline-first personal productivity backend.
//!
//! Tasks, notes, habits and finance records live in a local SQLite
//! database that is always written first; a background worker mirrors
//! them to a per-user cloud document store when one is configured. The
//! local database is the source of truth for reads, the remote wins on
//! download with last-write-wins overwrite semantics.

pub mod ai;
pub mod commands;
pub mod config;
pub mod db;
pub mod models;
pub mod remote;
pub mod repo;
pub mod sync;
