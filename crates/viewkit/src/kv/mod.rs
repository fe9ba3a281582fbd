// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Key-value storage used for the static cache write lock.
//!
//! The lock only needs three things from a store: read a key, write a key
//! with a time-to-live and remove a key. Expired entries must read as
//! absent.
//!
//! # Implementations
//!
//! - [`MemoryKVStore`]: process-local, for tests and single-process servers
//! - **CLI**: SQLite-backed persistent storage, shared between processes

mod memory;
mod types;

pub use memory::MemoryKVStore;
pub use types::{KVError, KVResult, PutOptions};

/// Platform-agnostic KV store trait.
///
/// Implementors provide the actual storage mechanism.
pub trait KVStore: Send + Sync {
    /// Get a value by key.
    ///
    /// Returns `None` if the key doesn't exist or is expired.
    fn get(&self, key: &str) -> KVResult<Option<Vec<u8>>>;

    /// Store a value with optional expiration.
    fn put(&self, key: &str, value: &[u8], options: PutOptions) -> KVResult<()>;

    /// Delete a key.
    ///
    /// No error is returned if the key doesn't exist.
    fn delete(&self, key: &str) -> KVResult<()>;
}
