// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! SQLite-backed KV store implementation.

use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};
use viewkit::kv::{KVError, KVResult, KVStore, PutOptions};

/// SQLite-backed KV store.
///
/// Each namespace shares the same SQLite database but uses a namespace
/// column to separate data.
pub struct SqliteKVStore {
    conn: Mutex<Connection>,
    namespace: String,
}

impl SqliteKVStore {
    /// Creates a new SQLite-backed KV store.
    ///
    /// The database file is stored at `data_dir/kv.db`.
    pub fn new(data_dir: &Path, namespace: &str) -> KVResult<Self> {
        let db_path = data_dir.join("kv.db");
        let conn = Connection::open(&db_path)
            .map_err(|e| KVError::Storage(format!("Failed to open database: {}", e)))?;

        // Several renders may race on the same lock row
        conn.busy_timeout(std::time::Duration::from_secs(5))
            .map_err(|e| KVError::Storage(e.to_string()))?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                namespace TEXT NOT NULL,
                key TEXT NOT NULL,
                value BLOB NOT NULL,
                expiration INTEGER,
                PRIMARY KEY (namespace, key)
            )
            "#,
            [],
        )
        .map_err(|e| KVError::Storage(format!("Failed to create table: {}", e)))?;

        Ok(Self {
            conn: Mutex::new(conn),
            namespace: namespace.to_string(),
        })
    }

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

impl KVStore for SqliteKVStore {
    fn get(&self, key: &str) -> KVResult<Option<Vec<u8>>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| KVError::Storage(e.to_string()))?;

        let result: Result<(Vec<u8>, Option<u64>), rusqlite::Error> = conn.query_row(
            "SELECT value, expiration FROM kv WHERE namespace = ?1 AND key = ?2",
            params![&self.namespace, key],
            |row| Ok((row.get(0)?, row.get(1)?)),
        );

        match result {
            Ok((_, Some(expiration))) if Self::now() >= expiration => {
                // Entry is expired, delete it and return None
                let _ = conn.execute(
                    "DELETE FROM kv WHERE namespace = ?1 AND key = ?2",
                    params![&self.namespace, key],
                );
                Ok(None)
            }
            Ok((value, _)) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(KVError::Storage(e.to_string())),
        }
    }

    fn put(&self, key: &str, value: &[u8], options: PutOptions) -> KVResult<()> {
        if key.is_empty() {
            return Err(KVError::InvalidOperation("key must not be empty".to_string()));
        }
        let conn = self
            .conn
            .lock()
            .map_err(|e| KVError::Storage(e.to_string()))?;

        conn.execute(
            r#"
            INSERT OR REPLACE INTO kv (namespace, key, value, expiration)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![&self.namespace, key, value, options.calculate_expiration()],
        )
        .map_err(|e| KVError::Storage(e.to_string()))?;

        Ok(())
    }

    fn delete(&self, key: &str) -> KVResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| KVError::Storage(e.to_string()))?;

        conn.execute(
            "DELETE FROM kv WHERE namespace = ?1 AND key = ?2",
            params![&self.namespace, key],
        )
        .map_err(|e| KVError::Storage(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, SqliteKVStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteKVStore::new(temp_dir.path(), "test").unwrap();
        (temp_dir, store)
    }

    #[test]
    fn test_basic_operations() {
        let (_temp_dir, store) = create_test_store();

        store.put("key1", b"value1", PutOptions::default()).unwrap();
        assert_eq!(store.get("key1").unwrap(), Some(b"value1".to_vec()));

        assert_eq!(store.get("nonexistent").unwrap(), None);

        store.delete("key1").unwrap();
        assert_eq!(store.get("key1").unwrap(), None);
    }

    #[test]
    fn test_expiration() {
        let (_temp_dir, store) = create_test_store();

        let expired = PutOptions {
            expiration: Some(1),
            ..Default::default()
        };
        store.put("old", b"locked", expired).unwrap();
        assert_eq!(store.get("old").unwrap(), None);

        store.put("fresh", b"locked", PutOptions::ttl(10)).unwrap();
        assert_eq!(store.get("fresh").unwrap(), Some(b"locked".to_vec()));
    }

    #[test]
    fn test_namespaces_and_processes_share_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let first = SqliteKVStore::new(temp_dir.path(), "static_cache").unwrap();
        let second = SqliteKVStore::new(temp_dir.path(), "static_cache").unwrap();
        let other = SqliteKVStore::new(temp_dir.path(), "other").unwrap();

        first.put("lock", b"locked", PutOptions::ttl(10)).unwrap();
        assert_eq!(second.get("lock").unwrap(), Some(b"locked".to_vec()));
        assert_eq!(other.get("lock").unwrap(), None);
    }
}
