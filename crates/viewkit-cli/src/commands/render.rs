// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! View rendering command.

use crate::commands::parse_pair;
use crate::config::Config;
use crate::kv::open_lock_store;
use console::style;
use serde_json::Value as JsonValue;
use std::fs;
use std::path::{Path, PathBuf};
use viewkit::{Bindings, FileSystemResolver, LuaExecutor, RequestContext, ViewEngine};

/// What to render.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// View name, relative to the view directory and without extension.
    pub script: String,
    /// JSON file holding an object of view data.
    pub data_file: Option<PathBuf>,
    /// `KEY=VALUE` pairs applied over the data file.
    pub set: Vec<String>,
    /// Layout to render into, `None` for the bare view.
    pub layout: Option<String>,
    /// Request URI.
    pub url: String,
    /// Request host.
    pub host: Option<String>,
}

/// Renders a view of the project at `root` and prints it or writes it to
/// `output`.
pub fn run(root: &Path, options: RenderOptions, output: Option<&Path>) -> anyhow::Result<()> {
    let html = render(root, &options)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, &html)?;
            eprintln!(
                "{} {} {}",
                style("✓").green(),
                style(&options.script).bold(),
                style(format!("→ {}", path.display())).dim()
            );
        }
        None => println!("{}", html),
    }
    Ok(())
}

/// Renders a view of the project at `root`.
///
/// The static cache is attached when the project enables
/// `static_page_caching`, with its write locks in the project's SQLite lock
/// store.
pub fn render(root: &Path, options: &RenderOptions) -> anyhow::Result<String> {
    let config = Config::load(root)?;
    let view_config = config.view_config(root)?;
    let caching = view_config.static_page_caching;

    let executor = LuaExecutor::new(FileSystemResolver::new().with_root(root));
    let mut engine = ViewEngine::new(view_config, executor)?;
    if caching {
        engine = engine.with_static_cache(open_lock_store(&config.data_dir(root))?);
    }

    let data = load_bindings(options.data_file.as_deref(), &options.set)?;
    let mut request = RequestContext::new(options.url.as_str());
    if let Some(host) = &options.host {
        request = request.with_host(host.as_str());
    }

    tracing::info!(script = %options.script, url = %options.url, "Rendering");
    let html = engine.render_page(request, &options.script, &data, options.layout.as_deref())?;
    Ok(html)
}

/// Builds the view data from an optional JSON file and `KEY=VALUE` pairs.
///
/// Values that parse as JSON are used as such, anything else is a string.
pub fn load_bindings(data_file: Option<&Path>, set: &[String]) -> anyhow::Result<Bindings> {
    let mut data = match data_file {
        Some(path) => {
            let content = fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("Cannot read {}: {}", path.display(), e))?;
            match serde_json::from_str::<JsonValue>(&content)? {
                JsonValue::Object(map) => map,
                _ => anyhow::bail!("{} must contain a JSON object", path.display()),
            }
        }
        None => Bindings::new(),
    };

    for pair in set {
        let (key, raw) = parse_pair(pair)?;
        let value = serde_json::from_str(&raw).unwrap_or(JsonValue::String(raw));
        data.insert(key, value);
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_load_bindings() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("data.json");
        fs::write(&file, r#"{ "title": "From file", "tags": ["a"] }"#).unwrap();

        let data = load_bindings(
            Some(&file),
            &["title=Override".to_string(), "count=3".to_string(), "flag=true".to_string()],
        )
        .unwrap();
        assert_eq!(data["title"], json!("Override"));
        assert_eq!(data["count"], json!(3));
        assert_eq!(data["flag"], json!(true));
        assert_eq!(data["tags"], json!(["a"]));
    }

    #[test]
    fn test_data_file_must_be_an_object() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("data.json");
        fs::write(&file, "[1, 2]").unwrap();
        assert!(load_bindings(Some(&file), &[]).is_err());
    }
}
