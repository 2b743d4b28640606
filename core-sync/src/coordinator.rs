//! # Sync Coordinator
//!
//! Orchestrates synchronization between the remote disk, the local mirror
//! store and the snapshot cache.
//!
//! ## Workflow
//!
//! 1. Look up the snapshot cache; a hit short-circuits the whole flow unless
//!    the caller forces a resync
//! 2. Validate the credential with a lightweight probe
//! 3. Drive the remote enumeration stream to completion, flushing upsert
//!    batches into the mirror store as entries are produced
//! 4. Prune mirror rows the enumeration did not touch
//! 5. Store the materialized list in the snapshot cache and return it
//!
//! A failure anywhere aborts the resync: batches already flushed stay in the
//! mirror (the partial mirror is tolerated, never rolled back), the snapshot
//! cache keeps whatever it held before, and no pruning happens.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_sync::{SnapshotCache, SyncConfig, SyncCoordinator};
//! use std::sync::Arc;
//!
//! let coordinator = SyncCoordinator::new(remote, store, snapshots, SyncConfig::default());
//! let entries = coordinator.get_entries(&token, false).await?;
//! let links = coordinator.resolve_download_links(&entries, &[0, 2]).await?;
//! ```

use async_trait::async_trait;
use core_mirror::{Entry, EntryRepository};
use futures::stream::BoxStream;
use futures::StreamExt;
use provider_yandex_disk::YandexDiskClient;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, SyncError};
use crate::snapshot::SnapshotCache;

/// Remote tree operations the coordinator drives
///
/// Implemented by [`YandexDiskClient`]; mocked in tests.
#[async_trait]
pub trait RemoteTree: Send + Sync {
    /// Validate the bound credential with a lightweight probe
    async fn validate_credential(&self) -> provider_yandex_disk::Result<bool>;

    /// Lazily enumerate every entry under `root`, depth-first
    fn enumerate_tree(&self, root: &str)
        -> BoxStream<'static, provider_yandex_disk::Result<Entry>>;

    /// Resolve one path to an ephemeral download URL
    async fn download_link(&self, path: &str) -> provider_yandex_disk::Result<String>;
}

#[async_trait]
impl RemoteTree for YandexDiskClient {
    async fn validate_credential(&self) -> provider_yandex_disk::Result<bool> {
        YandexDiskClient::validate_credential(self).await
    }

    fn enumerate_tree(
        &self,
        root: &str,
    ) -> BoxStream<'static, provider_yandex_disk::Result<Entry>> {
        YandexDiskClient::enumerate_tree(self, root)
    }

    async fn download_link(&self, path: &str) -> provider_yandex_disk::Result<String> {
        YandexDiskClient::download_link(self, path).await
    }
}

/// Sync coordinator configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Root path where full enumeration starts
    pub root_path: String,

    /// Entries per bulk-upsert flush while consuming the enumeration stream
    pub upsert_batch_size: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            root_path: "/".to_string(),
            upsert_batch_size: 100,
        }
    }
}

/// Coordinates cache lookups, full resynchronization and download resolution
/// for one caller session
pub struct SyncCoordinator {
    /// Remote tree client, bound to the session credential
    remote: Arc<dyn RemoteTree>,

    /// Mirror store receiving upsert batches
    store: Arc<dyn EntryRepository>,

    /// Shared per-credential snapshot cache
    snapshots: Arc<SnapshotCache>,

    config: SyncConfig,

    /// Cancels an in-flight enumeration between produced entries
    cancel: CancellationToken,
}

impl SyncCoordinator {
    pub fn new(
        remote: Arc<dyn RemoteTree>,
        store: Arc<dyn EntryRepository>,
        snapshots: Arc<SnapshotCache>,
        config: SyncConfig,
    ) -> Self {
        Self {
            remote,
            store,
            snapshots,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Token callers can use to abort an in-flight synchronization
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Entries for this credential, from the snapshot cache or by full resync
    ///
    /// `force` re-enumerates the remote tree regardless of cache state.
    /// Without it, a cached snapshot is returned unchanged and the remote is
    /// never contacted.
    #[instrument(skip(self, credential))]
    pub async fn get_entries(&self, credential: &str, force: bool) -> Result<Vec<Entry>> {
        if !force {
            if let Some(snapshot) = self.snapshots.get(credential).await {
                debug!(entries = snapshot.len(), "Serving entries from snapshot cache");
                return Ok(snapshot);
            }
        }

        self.resync(credential).await
    }

    /// Resolve the selected entries to download URLs, in selection order
    ///
    /// Out-of-range indices are skipped. The first failed resolution aborts
    /// the whole batch with the offending path named; links collected up to
    /// that point are discarded.
    #[instrument(skip(self, entries))]
    pub async fn resolve_download_links(
        &self,
        entries: &[Entry],
        indices: &[usize],
    ) -> Result<Vec<String>> {
        let mut links = Vec::new();

        for &index in indices {
            let Some(entry) = entries.get(index) else {
                warn!(index, "Selection index out of range, skipping");
                continue;
            };

            match self.remote.download_link(&entry.path).await {
                Ok(href) => links.push(href),
                Err(source) => {
                    warn!(path = %entry.path, error = %source, "Download link resolution failed");
                    return Err(SyncError::DownloadLink {
                        path: entry.path.clone(),
                        source,
                    });
                }
            }
        }

        info!(links = links.len(), "Resolved download links");
        Ok(links)
    }

    /// Full remote enumeration, persisting and caching the result
    async fn resync(&self, credential: &str) -> Result<Vec<Entry>> {
        self.remote.validate_credential().await?;

        let generation = self.store.next_generation().await?;
        info!(generation, root = %self.config.root_path, "Starting full resynchronization");

        let mut collected: Vec<Entry> = Vec::new();
        let mut batch: Vec<Entry> = Vec::with_capacity(self.config.upsert_batch_size);
        let mut stream = self.remote.enumerate_tree(&self.config.root_path);

        while let Some(produced) = stream.next().await {
            if self.cancel.is_cancelled() {
                warn!("Resynchronization cancelled");
                return Err(SyncError::Cancelled);
            }

            batch.push(produced?);

            if batch.len() >= self.config.upsert_batch_size {
                self.store.bulk_upsert(&batch, generation).await?;
                collected.append(&mut batch);
            }
        }

        if !batch.is_empty() {
            self.store.bulk_upsert(&batch, generation).await?;
            collected.append(&mut batch);
        }

        let pruned = self.store.prune_stale(generation).await?;
        if pruned > 0 {
            info!(pruned, "Removed entries no longer present remotely");
        }

        self.snapshots.set(credential, collected.clone()).await;
        info!(entries = collected.len(), "Resynchronization complete");

        Ok(collected)
    }
}
