//! # Mirror Store Module
//!
//! Owns the local persistent copy of the remote disk tree.
//!
//! ## Overview
//!
//! This module manages:
//! - SQLite database schema and migrations for mirrored entries
//! - The [`Entry`] domain model (path-keyed files and directories)
//! - The upsert-only [`EntryRepository`] with generation-based pruning
//!
//! The mirror never deletes through the upsert path; paths that vanished
//! remotely are removed by pruning generations older than the last fully
//! successful synchronization.

pub mod db;
pub mod error;
pub mod models;
pub mod repository;

pub use db::{create_pool, create_test_pool, DatabaseConfig};
pub use error::{MirrorError, Result};
pub use models::{Entry, EntryKind};
pub use repository::{EntryRepository, SqliteEntryRepository};
