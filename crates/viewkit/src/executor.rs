// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! The template execution seam.
//!
//! The engine never interprets template files itself. It resolves a path,
//! opens an output frame and hands an [`Execution`] to a
//! [`TemplateExecutor`], which runs the file and writes its output through
//! the [`RenderContext`].
//!
//! The crate ships [`LuaExecutor`](crate::LuaExecutor). Implement the trait
//! to plug in any other execution environment.

use crate::context::RenderContext;
use crate::engine::ViewEngine;
use crate::error::ViewError;
use serde_json::Value as JsonValue;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Data injected into a template, keyed by variable name.
pub type Bindings = serde_json::Map<String, JsonValue>;

/// Which stage of the render pipeline a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    /// A page template from the view directory.
    Template,
    /// A layout from the layout directory.
    Layout,
    /// A partial from the partials directory.
    Partial,
}

impl TemplateKind {
    /// Prefix under which bindings are exposed to the file.
    ///
    /// Layouts share the template's `view` prefix since they see the same
    /// data.
    pub fn binding_prefix(self) -> &'static str {
        match self {
            TemplateKind::Template | TemplateKind::Layout => "view",
            TemplateKind::Partial => "parts",
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TemplateKind::Template => "template",
            TemplateKind::Layout => "layout",
            TemplateKind::Partial => "partial",
        };
        f.write_str(name)
    }
}

/// One file to execute.
#[derive(Debug, Clone, Copy)]
pub struct Execution<'a> {
    /// Pipeline stage.
    pub kind: TemplateKind,
    /// Resolved file path.
    pub path: &'a Path,
    /// Data for the file, before prefixing.
    pub bindings: &'a Bindings,
}

impl<'a> Execution<'a> {
    /// Bindings with their names prefixed for this stage, e.g. `view_title`
    /// or `parts_items`.
    pub fn prefixed_bindings(&self) -> impl Iterator<Item = (String, &'a JsonValue)> + 'a {
        let prefix = self.kind.binding_prefix();
        self.bindings
            .iter()
            .map(move |(name, value)| (format!("{}_{}", prefix, name), value))
    }
}

/// Errors returned by a [`TemplateExecutor`].
#[derive(Error, Debug)]
pub enum ExecError {
    /// The file does not exist.
    #[error("file not found")]
    NotFound,

    /// The file exists but could not be read or failed while running.
    #[error("{0}")]
    Failed(String),

    /// The file raised a view error, e.g. through a placeholder call or a
    /// nested partial. Passed to the caller unchanged.
    #[error(transparent)]
    View(#[from] ViewError),
}

/// Runs template files.
///
/// Implementations write output with [`RenderContext::write`] and may call
/// back into the engine (for partials or links) through `engine`.
pub trait TemplateExecutor: Send + Sync {
    /// Executes one file.
    fn execute(
        &self,
        engine: &ViewEngine,
        execution: &Execution<'_>,
        ctx: &mut RenderContext,
    ) -> Result<(), ExecError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prefixed_bindings() {
        let bindings = json!({ "title": "Home", "count": 3 })
            .as_object()
            .cloned()
            .unwrap();
        let path = Path::new("views/index.lua");

        let template = Execution { kind: TemplateKind::Template, path, bindings: &bindings };
        let names: Vec<String> = template.prefixed_bindings().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["view_count", "view_title"]);

        let partial = Execution { kind: TemplateKind::Partial, path, bindings: &bindings };
        let (name, value) = partial.prefixed_bindings().next().unwrap();
        assert_eq!(name, "parts_count");
        assert_eq!(value, &json!(3));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(TemplateKind::Template.to_string(), "template");
        assert_eq!(TemplateKind::Layout.to_string(), "layout");
        assert_eq!(TemplateKind::Partial.to_string(), "partial");
        assert_eq!(TemplateKind::Layout.binding_prefix(), "view");
    }
}
