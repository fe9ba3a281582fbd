// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Static page cache.
//!
//! Rendered pages are written to `<static_cache_root>/<location>/index.html`,
//! where the location is the configured custom cache location or the
//! request path. Writes are guarded by a short-lived lock key in a shared
//! [`KVStore`] so that concurrent identical requests do not all rewrite the
//! same file.
//!
//! The lock is never released after a write. It expires on its own after
//! [`LOCK_TTL_SECS`], which throttles rewrites of a single page to one per
//! window.

use crate::config::ViewConfig;
use crate::error::{Result, ViewError};
use crate::kv::{KVStore, PutOptions};
use crate::request::RequestContext;
use crate::resolver::path_to_string;
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Seconds a write lock is held.
pub const LOCK_TTL_SECS: u64 = 10;

/// File name written inside each cache location.
pub const CACHE_FILE_NAME: &str = "index.html";

const LOCK_KEY_PREFIX: &str = "static_cache_write_lock_v2_";
const LOCK_MARKER: &[u8] = b"locked";

/// What a cache attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    /// Static page caching is switched off.
    Disabled,
    /// Another writer holds the lock for this file.
    Locked,
    /// The file already holds this content.
    Unchanged,
    /// The file was written.
    Written,
}

impl CacheOutcome {
    /// Whether the file was written.
    pub fn written(self) -> bool {
        self == CacheOutcome::Written
    }
}

impl fmt::Display for CacheOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CacheOutcome::Disabled => "disabled",
            CacheOutcome::Locked => "locked",
            CacheOutcome::Unchanged => "unchanged",
            CacheOutcome::Written => "written",
        };
        f.write_str(s)
    }
}

/// Writes rendered pages to the static cache.
#[derive(Clone)]
pub struct StaticCache {
    store: Arc<dyn KVStore>,
}

impl fmt::Debug for StaticCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCache").finish_non_exhaustive()
    }
}

impl StaticCache {
    /// Creates a cache writer using `store` for write locks.
    pub fn new(store: Arc<dyn KVStore>) -> Self {
        Self { store }
    }

    /// The location a request is cached under.
    pub fn location(config: &ViewConfig, request: &RequestContext) -> String {
        match config.custom_cache_location.as_deref() {
            Some(custom) if !custom.is_empty() => custom.to_string(),
            _ => request.path().to_string(),
        }
    }

    /// The cache file for a location.
    ///
    /// Fails with [`ViewError::CacheWriteFailed`] if the location would leave
    /// the cache root.
    pub fn cache_file(config: &ViewConfig, location: &str) -> Result<PathBuf> {
        let relative = Path::new(location.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(ViewError::CacheWriteFailed {
                path: location.to_string(),
                reason: "cache location must stay below the cache root".to_string(),
            });
        }
        Ok(config.static_cache_root.join(relative).join(CACHE_FILE_NAME))
    }

    /// The lock key guarding writes to `cache_file`.
    pub fn lock_key(cache_file: &Path) -> String {
        let material = format!("{}{}", LOCK_KEY_PREFIX, path_to_string(cache_file));
        format!("{:x}", Sha256::digest(material.as_bytes()))
    }

    /// Writes `content` to the cache file for `request` if caching is
    /// enabled, no other writer holds the lock and the content differs from
    /// what is on disk.
    pub fn write(
        &self,
        config: &ViewConfig,
        request: &RequestContext,
        content: &str,
    ) -> Result<CacheOutcome> {
        if !config.static_page_caching {
            return Ok(CacheOutcome::Disabled);
        }

        let location = Self::location(config, request);
        let cache_file = Self::cache_file(config, &location)?;
        let lock_key = Self::lock_key(&cache_file);
        let failed = |reason: String| ViewError::CacheWriteFailed {
            path: cache_file.display().to_string(),
            reason,
        };

        let lock = self.store.get(&lock_key).map_err(|e| failed(e.to_string()))?;
        if lock.as_deref() == Some(LOCK_MARKER) {
            warn!(path = %cache_file.display(), "Static cache write locked, skipping");
            return Ok(CacheOutcome::Locked);
        }

        if let Some(dir) = cache_file.parent() {
            fs::create_dir_all(dir).map_err(|e| failed(e.to_string()))?;
        }

        match fs::read(&cache_file) {
            Ok(existing) if Sha256::digest(&existing) == Sha256::digest(content.as_bytes()) => {
                debug!(path = %cache_file.display(), "Static cache up to date");
                return Ok(CacheOutcome::Unchanged);
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(failed(e.to_string())),
        }

        self.store
            .put(&lock_key, LOCK_MARKER, PutOptions::ttl(LOCK_TTL_SECS))
            .map_err(|e| failed(e.to_string()))?;
        fs::write(&cache_file, content).map_err(|e| failed(e.to_string()))?;

        info!(path = %cache_file.display(), bytes = content.len(), "Static cache written");
        Ok(CacheOutcome::Written)
    }

    /// HTML comments appended to a rendered page when a cache is attached.
    pub fn footer(location: &str, written: bool) -> String {
        format!(
            "\n<!-- Generated: {} -->\n<!-- Location: {} -->\n<!-- cache Updated: {} -->",
            chrono::Utc::now().to_rfc2822(),
            location,
            written
        )
    }
}
