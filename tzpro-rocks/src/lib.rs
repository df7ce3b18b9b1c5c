//! RocksDB-backed settings store for TimeZone Pro.

use std::path::Path;

use rocksdb::{DB, Options};
use thiserror::Error;
use tzpro_core::Store;

#[derive(Debug, Error)]
#[error("RocksDB error: {0}")]
pub struct RocksError(#[from] rocksdb::Error);

/// A persistent store backed by RocksDB.
pub struct RocksStore {
    db: DB,
}

impl RocksStore {
    /// Opens a RocksDB store at the given path.
    ///
    /// Creates the database if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RocksError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        let db = DB::open(&opts, path)?;
        Ok(Self { db })
    }
}

impl Store for RocksStore {
    type Error = RocksError;

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Self::Error> {
        Ok(self.db.get(key.as_bytes())?)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), Self::Error> {
        self.db.put(key.as_bytes(), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Self::Error> {
        self.db.delete(key.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store() -> (RocksStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RocksStore::open(dir.path()).unwrap();
        (store, dir)
    }

    #[test]
    fn put_get() {
        let (store, _dir) = temp_store();

        store.put("navCollapsed", b"true").unwrap();

        assert_eq!(store.get("navCollapsed").unwrap(), Some(b"true".to_vec()));
    }

    #[test]
    fn get_missing() {
        let (store, _dir) = temp_store();
        assert_eq!(store.get("timezoneProSettings").unwrap(), None);
    }

    #[test]
    fn remove() {
        let (store, _dir) = temp_store();

        store.put("userDefaultSettings", b"{}").unwrap();
        store.remove("userDefaultSettings").unwrap();
        assert_eq!(store.get("userDefaultSettings").unwrap(), None);

        store.remove("userDefaultSettings").unwrap();
    }

    #[test]
    fn persistence() {
        let dir = TempDir::new().unwrap();
        let value = br#"{"displayedTimezones":["Asia/Tokyo"]}"#;

        {
            let store = RocksStore::open(dir.path()).unwrap();
            store.put("timezoneProSettings", value).unwrap();
        }

        {
            let store = RocksStore::open(dir.path()).unwrap();
            let retrieved = store.get("timezoneProSettings").unwrap();
            assert_eq!(retrieved, Some(value.to_vec()));
        }
    }
}
