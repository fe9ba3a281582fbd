// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! In-memory KV store implementation.

use super::types::unix_now;
use super::{KVError, KVResult, KVStore, PutOptions};
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Clone)]
struct MemoryEntry {
    value: Vec<u8>,
    expiration: Option<u64>,
}

impl MemoryEntry {
    fn is_expired(&self, now: u64) -> bool {
        self.expiration.is_some_and(|exp| now >= exp)
    }
}

/// In-memory KV store implementation.
///
/// Data is lost when the process exits and is not shared with other
/// processes.
#[derive(Default)]
pub struct MemoryKVStore {
    data: RwLock<HashMap<String, MemoryEntry>>,
}

impl MemoryKVStore {
    /// Create a new in-memory KV store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KVStore for MemoryKVStore {
    fn get(&self, key: &str) -> KVResult<Option<Vec<u8>>> {
        let data = self.data.read().map_err(|e| KVError::Storage(e.to_string()))?;

        match data.get(key) {
            Some(entry) if !entry.is_expired(unix_now()) => Ok(Some(entry.value.clone())),
            _ => Ok(None),
        }
    }

    fn put(&self, key: &str, value: &[u8], options: PutOptions) -> KVResult<()> {
        if key.is_empty() {
            return Err(KVError::InvalidOperation("key must not be empty".to_string()));
        }
        let mut data = self
            .data
            .write()
            .map_err(|e| KVError::Storage(e.to_string()))?;

        // Drop stale entries while we hold the write lock
        let now = unix_now();
        data.retain(|_, entry| !entry.is_expired(now));

        data.insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_vec(),
                expiration: options.calculate_expiration(),
            },
        );
        Ok(())
    }

    fn delete(&self, key: &str) -> KVResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| KVError::Storage(e.to_string()))?;

        data.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_operations() {
        let store = MemoryKVStore::new();

        store.put("key1", b"value1", PutOptions::default()).unwrap();
        assert_eq!(store.get("key1").unwrap(), Some(b"value1".to_vec()));

        assert_eq!(store.get("nonexistent").unwrap(), None);

        store.delete("key1").unwrap();
        assert_eq!(store.get("key1").unwrap(), None);

        // Deleting twice is fine
        store.delete("key1").unwrap();
    }

    #[test]
    fn test_expiration() {
        let store = MemoryKVStore::new();

        let options = PutOptions {
            expiration: Some(1),
            ..Default::default()
        };
        store.put("old", b"value", options).unwrap();
        assert_eq!(store.get("old").unwrap(), None);

        store.put("fresh", b"value", PutOptions::ttl(3600)).unwrap();
        assert_eq!(store.get("fresh").unwrap(), Some(b"value".to_vec()));
    }

    #[test]
    fn test_empty_key_rejected() {
        let store = MemoryKVStore::new();
        assert!(matches!(
            store.put("", b"x", PutOptions::default()),
            Err(KVError::InvalidOperation(_))
        ));
    }
}
