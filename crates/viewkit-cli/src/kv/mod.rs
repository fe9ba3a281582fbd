// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! CLI KV store implementation using SQLite.
//!
//! Static cache write locks must be visible to every process rendering the
//! same project, so the CLI keeps them in a SQLite database under the
//! project's data directory.

mod sqlite;

pub use sqlite::SqliteKVStore;

use std::path::Path;
use std::sync::Arc;

/// Namespace holding static cache write locks.
pub const LOCK_NAMESPACE: &str = "static_cache";

/// Opens the lock store in `data_dir`, creating the directory if needed.
pub fn open_lock_store(data_dir: &Path) -> anyhow::Result<Arc<SqliteKVStore>> {
    std::fs::create_dir_all(data_dir)?;
    let store = SqliteKVStore::new(data_dir, LOCK_NAMESPACE)?;
    Ok(Arc::new(store))
}
