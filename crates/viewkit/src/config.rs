// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! View configuration.
//!
//! [`ViewConfig`] is built once at startup and read-only while rendering.
//! Options can be changed by name with [`ViewConfig::set_property`] or in
//! bulk with [`ViewConfig::apply`]. Both merge: any option that is not
//! mentioned keeps its current value.
//!
//! # Options
//!
//! | Name                    | Default           |
//! |-------------------------|-------------------|
//! | `view_directory`        | `views`           |
//! | `layout_directory`      | `layouts`         |
//! | `partials_directory`    | `parts`           |
//! | `template_extension`    | `lua`             |
//! | `static_page_caching`   | `false`           |
//! | `static_cache_root`     | `_static_cache`   |
//! | `custom_cache_location` | unset             |

use crate::error::{Result, ViewError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Option name for the template directory.
pub const CONFIG_VIEW_DIR: &str = "view_directory";
/// Option name for the layout directory.
pub const CONFIG_LAYOUT_DIR: &str = "layout_directory";
/// Option name for the partials directory.
pub const CONFIG_PARTS_DIR: &str = "partials_directory";
/// Option name for the extension appended to template and layout names.
pub const CONFIG_TEMPLATE_EXTENSION: &str = "template_extension";
/// Option name for the static page caching switch.
pub const CONFIG_STATIC_PAGE_CACHING: &str = "static_page_caching";
/// Option name for the static cache root directory.
pub const CONFIG_STATIC_CACHE_DIR: &str = "static_cache_root";
/// Option name for the custom cache location.
pub const CONFIG_CUSTOM_CACHE_DIR: &str = "custom_cache_location";

/// Configuration for a [`ViewEngine`](crate::ViewEngine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewConfig {
    /// Directory holding templates.
    pub view_directory: PathBuf,
    /// Directory holding layouts.
    pub layout_directory: PathBuf,
    /// Directory holding partials.
    pub partials_directory: PathBuf,
    /// Extension (without the dot) appended to template and layout names.
    pub template_extension: String,
    /// Whether rendered pages are written to the static cache.
    pub static_page_caching: bool,
    /// Root directory for static cache files.
    pub static_cache_root: PathBuf,
    /// Location under the cache root used instead of the request path.
    pub custom_cache_location: Option<String>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            view_directory: PathBuf::from("views"),
            layout_directory: PathBuf::from("layouts"),
            partials_directory: PathBuf::from("parts"),
            template_extension: "lua".to_string(),
            static_page_caching: false,
            static_cache_root: PathBuf::from("_static_cache"),
            custom_cache_location: None,
        }
    }
}

/// A partial set of options, merged over an existing [`ViewConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    /// See [`ViewConfig::view_directory`].
    pub view_directory: Option<PathBuf>,
    /// See [`ViewConfig::layout_directory`].
    pub layout_directory: Option<PathBuf>,
    /// See [`ViewConfig::partials_directory`].
    pub partials_directory: Option<PathBuf>,
    /// See [`ViewConfig::template_extension`].
    pub template_extension: Option<String>,
    /// See [`ViewConfig::static_page_caching`].
    pub static_page_caching: Option<bool>,
    /// See [`ViewConfig::static_cache_root`].
    pub static_cache_root: Option<PathBuf>,
    /// See [`ViewConfig::custom_cache_location`].
    pub custom_cache_location: Option<String>,
}

impl ViewConfig {
    /// Merges `overrides` into this configuration.
    pub fn apply(&mut self, overrides: ConfigOverrides) {
        if let Some(dir) = overrides.view_directory {
            self.view_directory = dir;
        }
        if let Some(dir) = overrides.layout_directory {
            self.layout_directory = dir;
        }
        if let Some(dir) = overrides.partials_directory {
            self.partials_directory = dir;
        }
        if let Some(ext) = overrides.template_extension {
            self.template_extension = ext;
        }
        if let Some(enabled) = overrides.static_page_caching {
            self.static_page_caching = enabled;
        }
        if let Some(root) = overrides.static_cache_root {
            self.static_cache_root = root;
        }
        if overrides.custom_cache_location.is_some() {
            self.custom_cache_location = overrides.custom_cache_location;
        }
    }

    /// Sets a single option by name.
    ///
    /// # Errors
    ///
    /// [`ViewError::InvalidConfig`] if the name is unknown or the value has
    /// the wrong type. The configuration is left unchanged in that case.
    ///
    /// # Example
    ///
    /// ```rust
    /// use viewkit::config::{ViewConfig, CONFIG_STATIC_PAGE_CACHING};
    ///
    /// let mut config = ViewConfig::default();
    /// config.set_property(CONFIG_STATIC_PAGE_CACHING, serde_json::json!(true))?;
    /// assert!(config.static_page_caching);
    /// # Ok::<(), viewkit::ViewError>(())
    /// ```
    pub fn set_property(&mut self, name: &str, value: serde_json::Value) -> Result<()> {
        let mut current = serde_json::to_value(&*self)
            .map_err(|e| ViewError::InvalidConfig(e.to_string()))?;
        let Some(fields) = current.as_object_mut() else {
            return Err(ViewError::InvalidConfig("configuration is not a map".to_string()));
        };
        if !fields.contains_key(name) {
            return Err(ViewError::InvalidConfig(format!("unknown option '{}'", name)));
        }
        fields.insert(name.to_string(), value);

        *self = serde_json::from_value(current)
            .map_err(|e| ViewError::InvalidConfig(format!("option '{}': {}", name, e)))?;
        Ok(())
    }

    /// Sets several options by name, in iteration order.
    ///
    /// Stops at the first invalid option; options before it stay applied.
    pub fn set_properties<I, K>(&mut self, properties: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, serde_json::Value)>,
        K: AsRef<str>,
    {
        for (name, value) in properties {
            self.set_property(name.as_ref(), value)?;
        }
        Ok(())
    }

    /// Checks that the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        let dirs = [
            (CONFIG_VIEW_DIR, &self.view_directory),
            (CONFIG_LAYOUT_DIR, &self.layout_directory),
            (CONFIG_PARTS_DIR, &self.partials_directory),
        ];
        for (name, dir) in dirs {
            if dir.as_os_str().is_empty() {
                return Err(ViewError::InvalidConfig(format!("'{}' must not be empty", name)));
            }
        }

        if self.template_extension.is_empty() || self.template_extension.starts_with('.') {
            return Err(ViewError::InvalidConfig(format!(
                "'{}' must be a non-empty extension without a leading dot, got '{}'",
                CONFIG_TEMPLATE_EXTENSION, self.template_extension
            )));
        }

        if self.static_page_caching && self.static_cache_root.as_os_str().is_empty() {
            return Err(ViewError::InvalidConfig(format!(
                "'{}' must be set when '{}' is enabled",
                CONFIG_STATIC_CACHE_DIR, CONFIG_STATIC_PAGE_CACHING
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_validate() {
        let config = ViewConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.static_page_caching);
        assert_eq!(config.custom_cache_location, None);
    }

    #[test]
    fn test_set_property_merges() {
        let mut config = ViewConfig::default();
        config.set_property(CONFIG_VIEW_DIR, json!("app/views")).unwrap();
        config
            .set_property(CONFIG_CUSTOM_CACHE_DIR, json!("/landing"))
            .unwrap();

        assert_eq!(config.view_directory, PathBuf::from("app/views"));
        assert_eq!(config.custom_cache_location.as_deref(), Some("/landing"));
        // Untouched options keep their defaults
        assert_eq!(config.layout_directory, PathBuf::from("layouts"));

        // Last write wins
        config.set_property(CONFIG_VIEW_DIR, json!("other")).unwrap();
        assert_eq!(config.view_directory, PathBuf::from("other"));

        config.set_property(CONFIG_CUSTOM_CACHE_DIR, json!(null)).unwrap();
        assert_eq!(config.custom_cache_location, None);
    }

    #[test]
    fn test_set_property_rejects_unknown_and_ill_typed() {
        let mut config = ViewConfig::default();
        assert!(matches!(
            config.set_property("colour", json!("blue")),
            Err(ViewError::InvalidConfig(_))
        ));

        let before = config.clone();
        assert!(matches!(
            config.set_property(CONFIG_STATIC_PAGE_CACHING, json!("yes")),
            Err(ViewError::InvalidConfig(_))
        ));
        assert_eq!(config, before);
    }

    #[test]
    fn test_set_properties() {
        let mut config = ViewConfig::default();
        config
            .set_properties([
                (CONFIG_STATIC_PAGE_CACHING, json!(true)),
                (CONFIG_STATIC_CACHE_DIR, json!("public/cache")),
            ])
            .unwrap();

        assert!(config.static_page_caching);
        assert_eq!(config.static_cache_root, PathBuf::from("public/cache"));
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = ViewConfig::default();
        config.apply(ConfigOverrides {
            partials_directory: Some(PathBuf::from("components")),
            template_extension: Some("tpl".to_string()),
            ..Default::default()
        });

        assert_eq!(config.partials_directory, PathBuf::from("components"));
        assert_eq!(config.template_extension, "tpl");
        assert_eq!(config.view_directory, PathBuf::from("views"));
    }

    #[test]
    fn test_validate() {
        let mut config = ViewConfig::default();
        config.template_extension = ".lua".to_string();
        assert!(config.validate().is_err());

        let mut config = ViewConfig::default();
        config.view_directory = PathBuf::new();
        assert!(config.validate().is_err());

        let mut config = ViewConfig::default();
        config.static_page_caching = true;
        config.static_cache_root = PathBuf::new();
        assert!(config.validate().is_err());
    }
}
