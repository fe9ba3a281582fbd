// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! viewkit project configuration.
//!
//! Configuration is loaded from `viewkit.toml` at the project root.
//!
//! # Example Configuration
//!
//! ```toml
//! [project]
//! name = "my-site"
//!
//! [view]
//! view_directory = "views"
//! layout_directory = "layouts"
//! partials_directory = "parts"
//! static_page_caching = true
//! static_cache_root = "public"
//!
//! [cache]
//! data_dir = ".viewkit/data"
//! ```
//!
//! Relative paths are relative to the project root.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use viewkit::{ConfigOverrides, ViewConfig};

/// Name of the configuration file.
pub const CONFIG_FILE: &str = "viewkit.toml";

/// Main configuration structure loaded from `viewkit.toml`.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Project metadata.
    #[serde(default)]
    pub project: ProjectConfig,
    /// View options, merged over the library defaults.
    #[serde(default)]
    pub view: ConfigOverrides,
    /// Static cache lock storage.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Project metadata configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct ProjectConfig {
    /// Project name.
    pub name: String,
    /// Project version (default: "0.1.0").
    #[serde(default = "default_version")]
    pub version: String,
}

/// Storage for static cache write locks.
#[derive(Debug, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Directory for the SQLite lock store (default: ".viewkit/data").
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".viewkit/data")
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "unnamed".to_string(),
            version: default_version(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl Config {
    /// Loads `viewkit.toml` from the project root.
    ///
    /// If no configuration file exists, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be parsed.
    pub fn load(root: &Path) -> anyhow::Result<Self> {
        let config_path = root.join(CONFIG_FILE);

        if !config_path.exists() {
            tracing::debug!("No {} in {}, using defaults", CONFIG_FILE, root.display());
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid {}: {}", config_path.display(), e))?;
        Ok(config)
    }

    /// The effective view configuration for a project at `root`.
    ///
    /// The static cache root is anchored at `root` when relative. View
    /// directories stay relative; they are resolved by the project's
    /// resolver.
    pub fn view_config(&self, root: &Path) -> anyhow::Result<ViewConfig> {
        let mut config = ViewConfig::default();
        config.apply(self.view.clone());
        if config.static_cache_root.is_relative() {
            config.static_cache_root = root.join(&config.static_cache_root);
        }
        config.validate()?;
        Ok(config)
    }

    /// The lock store directory for a project at `root`.
    pub fn data_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.cache.data_dir)
    }
}
