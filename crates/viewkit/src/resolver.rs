// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Template source resolution.
//!
//! This module provides the [`ResourceResolver`] trait and implementations
//! for loading template files by path.
//!
//! # Resolver Implementations
//!
//! - [`FileSystemResolver`]: Reads files from disk, optionally below a
//!   project root
//! - [`MemoryResourceResolver`]: Serves sources registered in memory
//!   (testing, demos)
//!
//! Paths are compared after normalisation: `.` components are dropped and
//! separators become `/`, so `./views/index.lua` and `views/index.lua` name
//! the same resource.

use crate::executor::ExecError;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Converts a path to a normalized string with forward slashes and no `.`
/// components.
pub fn path_to_string<P: AsRef<Path>>(path: P) -> String {
    let mut result = String::new();
    for component in path.as_ref().components() {
        match component {
            Component::CurDir => continue,
            Component::RootDir => {
                result.push('/');
                continue;
            }
            Component::Prefix(p) => result.push_str(&p.as_os_str().to_string_lossy()),
            Component::ParentDir => result.push_str(".."),
            Component::Normal(s) => result.push_str(&s.to_string_lossy()),
        }
        result.push('/');
    }
    if result.len() > 1 && result.ends_with('/') {
        result.pop();
    }
    result
}

/// A resolved template resource with its path and source code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedResource {
    /// The normalized path of the resource.
    pub path: String,
    /// The source code.
    pub source: String,
}

/// Trait for loading template sources.
pub trait ResourceResolver: Send + Sync + 'static {
    /// Loads the source at `path`.
    ///
    /// Returns [`ExecError::NotFound`] when nothing exists at `path`.
    fn resolve(&self, path: &Path) -> Result<ResolvedResource, ExecError>;
}

/// Filesystem-based resource resolver.
///
/// Relative paths are joined onto the root directory, when one is set.
///
/// # Examples
///
/// ```rust,no_run
/// use viewkit::{FileSystemResolver, ResourceResolver};
/// use std::path::Path;
///
/// let resolver = FileSystemResolver::new().with_root("./site");
/// let resource = resolver.resolve(Path::new("views/index.lua"))?;
/// # Ok::<(), viewkit::ExecError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct FileSystemResolver {
    /// Directory relative paths are resolved against.
    pub root_dir: Option<PathBuf>,
}

impl FileSystemResolver {
    /// Creates a resolver that reads paths as given.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves relative paths against `root`.
    pub fn with_root<P: AsRef<Path>>(mut self, root: P) -> Self {
        self.root_dir = Some(root.as_ref().to_path_buf());
        self
    }

    fn full_path(&self, path: &Path) -> PathBuf {
        match &self.root_dir {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl ResourceResolver for FileSystemResolver {
    fn resolve(&self, path: &Path) -> Result<ResolvedResource, ExecError> {
        let full_path = self.full_path(path);
        if !full_path.is_file() {
            return Err(ExecError::NotFound);
        }

        let source = std::fs::read_to_string(&full_path).map_err(|e| {
            ExecError::Failed(format!("Cannot read '{}': {}", full_path.display(), e))
        })?;

        Ok(ResolvedResource {
            path: path_to_string(&full_path),
            source,
        })
    }
}

/// Memory-based resource resolver.
///
/// Clones share the same storage, so sources can be added after the
/// resolver has been handed to an executor.
#[derive(Debug, Clone, Default)]
pub struct MemoryResourceResolver {
    templates: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryResourceResolver {
    /// Creates an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `source` under `path`.
    pub fn add_resource<P: AsRef<Path>>(&self, path: P, source: &str) {
        self.write().insert(path_to_string(path), source.to_string());
    }

    /// Removes the source registered under `path`.
    pub fn remove_resource<P: AsRef<Path>>(&self, path: P) {
        self.write().remove(&path_to_string(path));
    }

    /// Whether a source is registered under `path`.
    pub fn contains<P: AsRef<Path>>(&self, path: P) -> bool {
        self.read().contains_key(&path_to_string(path))
    }

    // A panic while holding the lock leaves the map itself intact
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, String>> {
        self.templates.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, String>> {
        self.templates.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ResourceResolver for MemoryResourceResolver {
    fn resolve(&self, path: &Path) -> Result<ResolvedResource, ExecError> {
        let key = path_to_string(path);
        let templates = self.read();
        templates
            .get(&key)
            .map(|source| ResolvedResource {
                path: key.clone(),
                source: source.clone(),
            })
            .ok_or(ExecError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_path_to_string() {
        assert_eq!(path_to_string("./views/index.lua"), "views/index.lua");
        assert_eq!(path_to_string("views/./nested/a.lua"), "views/nested/a.lua");
        assert_eq!(path_to_string("/srv/site/parts"), "/srv/site/parts");
        assert_eq!(path_to_string("/"), "/");
    }

    #[test]
    fn test_filesystem_resolver() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("views")).unwrap();
        fs::write(temp_dir.path().join("views/index.lua"), "echo('hi')").unwrap();

        let resolver = FileSystemResolver::new().with_root(temp_dir.path());
        let resolved = resolver.resolve(Path::new("views/index.lua")).unwrap();
        assert_eq!(resolved.source, "echo('hi')");
        assert!(resolved.path.ends_with("views/index.lua"));

        // Absolute paths ignore the root
        let absolute = temp_dir.path().join("views/index.lua");
        let resolved = FileSystemResolver::new().resolve(&absolute).unwrap();
        assert_eq!(resolved.source, "echo('hi')");
    }

    #[test]
    fn test_filesystem_resolver_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = FileSystemResolver::new().with_root(temp_dir.path());

        assert!(matches!(
            resolver.resolve(Path::new("views/missing.lua")),
            Err(ExecError::NotFound)
        ));

        // Directories are not resources
        fs::create_dir_all(temp_dir.path().join("views")).unwrap();
        assert!(matches!(resolver.resolve(Path::new("views")), Err(ExecError::NotFound)));
    }

    #[test]
    fn test_memory_resolver() {
        let resolver = MemoryResourceResolver::new();
        resolver.add_resource("./parts/nested/widget", "echo(parts_foo)");

        let resolved = resolver.resolve(Path::new("parts/nested/widget")).unwrap();
        assert_eq!(resolved.path, "parts/nested/widget");
        assert_eq!(resolved.source, "echo(parts_foo)");

        // Clones share storage
        let clone = resolver.clone();
        resolver.remove_resource("parts/nested/widget");
        assert!(!clone.contains("parts/nested/widget"));
        assert!(matches!(
            clone.resolve(Path::new("parts/nested/widget")),
            Err(ExecError::NotFound)
        ));
    }

    #[test]
    fn test_memory_resolver_survives_poisoned_lock() {
        let resolver = MemoryResourceResolver::new();
        resolver.add_resource("views/index.lua", "echo('a')");

        let poisoner = resolver.clone();
        let result = std::thread::spawn(move || {
            let _guard = poisoner.templates.write().unwrap();
            panic!("render thread died");
        })
        .join();
        assert!(result.is_err());
        assert!(resolver.templates.is_poisoned());

        resolver.add_resource("views/about.lua", "echo('b')");
        assert!(resolver.contains("views/about.lua"));
        resolver.remove_resource("views/index.lua");
        assert!(!resolver.contains("views/index.lua"));
        assert_eq!(
            resolver.resolve(Path::new("views/about.lua")).unwrap().source,
            "echo('b')"
        );
    }
}
