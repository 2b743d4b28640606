//! Entry repository trait and SQLite implementation

use crate::error::Result;
use crate::models::Entry;
use sqlx::SqlitePool;
use tracing::{debug, instrument};

/// Entry repository interface for mirror store access
///
/// The mirror is upsert-only: rows are created or refreshed by
/// [`bulk_upsert`](EntryRepository::bulk_upsert) and are never deleted by it.
/// Removal of paths that disappeared remotely happens exclusively through
/// [`prune_stale`](EntryRepository::prune_stale), driven by the sync
/// generation stamped on each upserted row.
#[async_trait::async_trait]
pub trait EntryRepository: Send + Sync {
    /// Insert or update a batch of entries as one atomic unit.
    ///
    /// Entries whose path already exists have name, kind and both timestamps
    /// refreshed in place; new paths are inserted. Either the whole batch
    /// commits or none of it does.
    async fn bulk_upsert(&self, entries: &[Entry], generation: i64) -> Result<()>;

    /// Find an entry by its remote path.
    async fn find_by_path(&self, path: &str) -> Result<Option<Entry>>;

    /// All mirrored entries, ordered by path.
    async fn list_all(&self) -> Result<Vec<Entry>>;

    /// Count mirrored entries.
    async fn count(&self) -> Result<i64>;

    /// Next unused sync generation.
    async fn next_generation(&self) -> Result<i64>;

    /// Delete rows whose generation predates `generation`.
    ///
    /// # Returns
    /// Number of rows removed.
    async fn prune_stale(&self, generation: i64) -> Result<u64>;
}

/// SQLite implementation of EntryRepository
pub struct SqliteEntryRepository {
    pool: SqlitePool,
}

impl SqliteEntryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl EntryRepository for SqliteEntryRepository {
    #[instrument(skip(self, entries), fields(batch = entries.len()))]
    async fn bulk_upsert(&self, entries: &[Entry], generation: i64) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        for entry in entries {
            sqlx::query(
                r#"
                INSERT INTO entries (path, name, kind, created_at, modified_at, generation)
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT(path) DO UPDATE SET
                    name = excluded.name,
                    kind = excluded.kind,
                    created_at = excluded.created_at,
                    modified_at = excluded.modified_at,
                    generation = excluded.generation
                "#,
            )
            .bind(&entry.path)
            .bind(&entry.name)
            .bind(entry.kind)
            .bind(entry.created_at)
            .bind(entry.modified_at)
            .bind(generation)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        debug!(batch = entries.len(), "Upserted entry batch");
        Ok(())
    }

    async fn find_by_path(&self, path: &str) -> Result<Option<Entry>> {
        let entry = sqlx::query_as::<_, Entry>(
            "SELECT path, name, kind, created_at, modified_at FROM entries WHERE path = ?",
        )
        .bind(path)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    async fn list_all(&self) -> Result<Vec<Entry>> {
        let entries = sqlx::query_as::<_, Entry>(
            "SELECT path, name, kind, created_at, modified_at FROM entries ORDER BY path ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM entries")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    async fn next_generation(&self) -> Result<i64> {
        let next: (i64,) = sqlx::query_as("SELECT COALESCE(MAX(generation), 0) + 1 FROM entries")
            .fetch_one(&self.pool)
            .await?;

        Ok(next.0)
    }

    #[instrument(skip(self))]
    async fn prune_stale(&self, generation: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM entries WHERE generation < ?")
            .bind(generation)
            .execute(&self.pool)
            .await?;

        let pruned = result.rows_affected();
        if pruned > 0 {
            debug!(pruned, "Pruned stale entries");
        }
        Ok(pruned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::models::EntryKind;

    fn entry(path: &str, name: &str, kind: EntryKind) -> Entry {
        Entry {
            path: path.to_string(),
            name: name.to_string(),
            kind,
            created_at: 1700000000,
            modified_at: 1700000000,
        }
    }

    #[tokio::test]
    async fn test_bulk_upsert_and_list() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteEntryRepository::new(pool);

        let entries = vec![
            entry("/photos", "photos", EntryKind::Dir),
            entry("/photos/cat.jpg", "cat.jpg", EntryKind::File),
        ];
        repo.bulk_upsert(&entries, 1).await.unwrap();

        let stored = repo.list_all().await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].path, "/photos");
        assert_eq!(stored[1].path, "/photos/cat.jpg");
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent_on_path() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteEntryRepository::new(pool);

        repo.bulk_upsert(&[entry("/report.pdf", "report.pdf", EntryKind::File)], 1)
            .await
            .unwrap();

        let mut updated = entry("/report.pdf", "report-v2.pdf", EntryKind::File);
        updated.modified_at = 1700009999;
        repo.bulk_upsert(&[updated], 2).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 1);
        let stored = repo.find_by_path("/report.pdf").await.unwrap().unwrap();
        assert_eq!(stored.name, "report-v2.pdf");
        assert_eq!(stored.modified_at, 1700009999);
    }

    #[tokio::test]
    async fn test_find_by_path_missing() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteEntryRepository::new(pool);

        let found = repo.find_by_path("/nope").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_generation_sequence() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteEntryRepository::new(pool);

        assert_eq!(repo.next_generation().await.unwrap(), 1);

        repo.bulk_upsert(&[entry("/a.txt", "a.txt", EntryKind::File)], 1)
            .await
            .unwrap();

        assert_eq!(repo.next_generation().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_prune_stale_keeps_current_generation() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteEntryRepository::new(pool);

        repo.bulk_upsert(
            &[
                entry("/old.txt", "old.txt", EntryKind::File),
                entry("/kept.txt", "kept.txt", EntryKind::File),
            ],
            1,
        )
        .await
        .unwrap();

        // Second sync sees only one of the two paths.
        repo.bulk_upsert(&[entry("/kept.txt", "kept.txt", EntryKind::File)], 2)
            .await
            .unwrap();

        let pruned = repo.prune_stale(2).await.unwrap();
        assert_eq!(pruned, 1);
        assert!(repo.find_by_path("/old.txt").await.unwrap().is_none());
        assert!(repo.find_by_path("/kept.txt").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_empty_batch_is_a_no_op() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteEntryRepository::new(pool);

        repo.bulk_upsert(&[], 1).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}
