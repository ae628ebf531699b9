use async_trait::async_trait;
use mapmemo_shared::models::CityMemos;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;

use crate::memos::{default_memos, MemoStore, MemoStoreError};

const DOCUMENT_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("memo_document");
const REVISION_TABLE: TableDefinition<&str, u64> = TableDefinition::new("memo_revision");
const DOCUMENT_KEY: &str = "memos";

fn storage_err(e: impl std::fmt::Display) -> MemoStoreError {
    MemoStoreError::Storage(e.to_string())
}

/// Memo document in a local redb file. The revision counter counts saves.
pub struct Storage {
    db: Database,
}

impl Storage {
    pub fn open(path: &Path) -> Result<Arc<Self>, MemoStoreError> {
        let db = Database::create(path)
            .map_err(|e| MemoStoreError::Storage(format!("{}: {}", path.display(), e)))?;

        // Ensure tables exist
        let write_txn = db.begin_write().map_err(storage_err)?;
        {
            write_txn.open_table(DOCUMENT_TABLE).map_err(storage_err)?;
            write_txn.open_table(REVISION_TABLE).map_err(storage_err)?;
        }
        write_txn.commit().map_err(storage_err)?;

        Ok(Arc::new(Storage { db }))
    }

    /// The stored document and the revision it was read at (0 = never saved).
    pub fn load_with_revision(&self) -> Result<(CityMemos, u64), MemoStoreError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let revisions = read_txn.open_table(REVISION_TABLE).map_err(storage_err)?;
        let revision = revisions
            .get(DOCUMENT_KEY)
            .map_err(storage_err)?
            .map(|g| g.value())
            .unwrap_or(0);

        let documents = read_txn.open_table(DOCUMENT_TABLE).map_err(storage_err)?;
        let memos = match documents.get(DOCUMENT_KEY).map_err(storage_err)? {
            Some(value) => serde_json::from_slice(value.value())
                .map_err(|e| MemoStoreError::Decode(e.to_string()))?,
            None => default_memos(),
        };
        Ok((memos, revision))
    }

    /// Replace the document and bump the revision. redb runs one write
    /// transaction at a time, so the read of the old revision and the write
    /// of the new one cannot interleave with another save. Returns the new
    /// revision.
    pub fn store(&self, memos: &CityMemos) -> Result<u64, MemoStoreError> {
        let json = serde_json::to_vec(memos).map_err(|e| MemoStoreError::Decode(e.to_string()))?;

        let write_txn = self.db.begin_write().map_err(storage_err)?;
        let next = {
            let mut revisions = write_txn.open_table(REVISION_TABLE).map_err(storage_err)?;
            let current = revisions
                .get(DOCUMENT_KEY)
                .map_err(storage_err)?
                .map(|g| g.value())
                .unwrap_or(0);
            let next = current + 1;
            revisions.insert(DOCUMENT_KEY, next).map_err(storage_err)?;

            let mut documents = write_txn.open_table(DOCUMENT_TABLE).map_err(storage_err)?;
            documents
                .insert(DOCUMENT_KEY, json.as_slice())
                .map_err(storage_err)?;
            next
        };
        write_txn.commit().map_err(storage_err)?;
        Ok(next)
    }
}

#[async_trait]
impl MemoStore for Storage {
    async fn load(&self) -> Result<CityMemos, MemoStoreError> {
        self.load_with_revision().map(|(memos, _)| memos)
    }

    /// The last writer wins.
    async fn save(&self, memos: &CityMemos) -> Result<(), MemoStoreError> {
        let revision = self.store(memos)?;
        tracing::debug!(revision, "memo document stored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapmemo_shared::models::{City, Memo};

    fn open() -> (tempfile::TempDir, Arc<Storage>) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::open(&dir.path().join("memos.redb")).unwrap();
        (dir, storage)
    }

    fn with_memo(title: &str) -> CityMemos {
        let mut memos = default_memos();
        memos
            .get_mut(&City::new("RedCity"))
            .unwrap()
            .push(Memo::with_id("memo_1", title, chrono::Utc::now()));
        memos
    }

    #[tokio::test]
    async fn test_empty_store_returns_default_cities() {
        let (_dir, storage) = open();
        let (memos, revision) = storage.load_with_revision().unwrap();
        assert_eq!(revision, 0);
        assert_eq!(memos, default_memos());
        assert_eq!(storage.load().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let (_dir, storage) = open();
        let memos = with_memo("Bakery");
        storage.save(&memos).await.unwrap();
        storage.save(&memos).await.unwrap();
        let (loaded, revision) = storage.load_with_revision().unwrap();
        assert_eq!(loaded, memos);
        assert_eq!(revision, 2);
    }

    #[test]
    fn test_concurrent_saves_serialize() {
        let (_dir, storage) = open();
        let titles = ["left", "right"];
        std::thread::scope(|scope| {
            for title in titles {
                let storage = &storage;
                scope.spawn(move || storage.store(&with_memo(title)).unwrap());
            }
        });
        let (loaded, revision) = storage.load_with_revision().unwrap();
        assert_eq!(revision, 2);
        assert!(titles.contains(&loaded[&City::new("RedCity")][0].title.as_str()));
    }

    #[test]
    fn test_reopen_keeps_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memos.redb");
        {
            let storage = Storage::open(&path).unwrap();
            storage.store(&with_memo("persisted")).unwrap();
        }
        let storage = Storage::open(&path).unwrap();
        let (loaded, revision) = storage.load_with_revision().unwrap();
        assert_eq!(revision, 1);
        assert_eq!(loaded[&City::new("RedCity")][0].title, "persisted");
    }
}
