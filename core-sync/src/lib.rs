//! # Sync Module
//!
//! Orchestrates synchronization of the remote disk tree into the local
//! mirror.
//!
//! ## Overview
//!
//! This module manages:
//! - Serving cached entry snapshots or triggering a full remote enumeration
//! - Persisting produced entries into the mirror store as they arrive
//! - Pruning mirror rows that vanished from the remote tree
//! - Filtering entry lists by display category
//! - Resolving selected entries to ephemeral download URLs
//!
//! ## Components
//!
//! - **Sync Coordinator** (`coordinator`): cache-or-resync decision and
//!   download resolution
//! - **Snapshot Cache** (`snapshot`): per-credential LRU cache of
//!   materialized entry lists, keyed by a credential digest
//! - **Filter** (`filter`): category filtering for display
//! - **Logging** (`logging`): tracing-subscriber setup for the workspace

pub mod coordinator;
pub mod error;
pub mod filter;
pub mod logging;
pub mod snapshot;

pub use coordinator::{RemoteTree, SyncConfig, SyncCoordinator};
pub use error::{Result, SyncError};
pub use filter::filter_entries;
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use snapshot::SnapshotCache;
