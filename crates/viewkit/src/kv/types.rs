// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Type definitions for the KV store.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Result type for KV operations.
pub type KVResult<T> = Result<T, KVError>;

/// Error type for KV operations.
#[derive(Error, Debug)]
pub enum KVError {
    /// Storage backend error.
    #[error("Storage error: {0}")]
    Storage(String),
    /// Invalid operation (e.g., invalid key format).
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// Options for the `put` operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutOptions {
    /// Unix timestamp when the entry should expire.
    pub expiration: Option<u64>,
    /// Time-to-live in seconds from now.
    #[serde(rename = "expirationTtl")]
    pub expiration_ttl: Option<u64>,
}

impl PutOptions {
    /// Options expiring `secs` seconds from now.
    pub fn ttl(secs: u64) -> Self {
        Self {
            expiration_ttl: Some(secs),
            ..Self::default()
        }
    }

    /// Calculate the actual expiration timestamp.
    ///
    /// An absolute `expiration` wins over `expiration_ttl`. `None` means the
    /// entry never expires.
    pub fn calculate_expiration(&self) -> Option<u64> {
        match (self.expiration, self.expiration_ttl) {
            (Some(exp), _) => Some(exp),
            (None, Some(ttl)) => Some(unix_now() + ttl),
            (None, None) => None,
        }
    }
}

/// Current Unix timestamp in seconds.
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_expiration() {
        assert_eq!(PutOptions::default().calculate_expiration(), None);

        let absolute = PutOptions {
            expiration: Some(42),
            expiration_ttl: Some(10),
        };
        assert_eq!(absolute.calculate_expiration(), Some(42));

        let before = unix_now();
        let exp = PutOptions::ttl(10).calculate_expiration().unwrap();
        assert!(exp >= before + 10 && exp <= unix_now() + 10);
    }
}
