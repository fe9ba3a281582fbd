// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! The view engine: template, layout and partial composition.
//!
//! This module provides [`ViewEngine`], which resolves script names against
//! the configured directories, runs them through a [`TemplateExecutor`] and
//! hands content between stages through placeholders.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use viewkit::{FileSystemResolver, LuaExecutor, RequestContext, ViewConfig, ViewEngine};
//!
//! let executor = LuaExecutor::new(FileSystemResolver::new().with_root("./site"));
//! let engine = ViewEngine::new(ViewConfig::default(), executor)?;
//!
//! let data = serde_json::json!({ "title": "Home" });
//! let html = engine.render_page(
//!     RequestContext::new("/"),
//!     "index",
//!     data.as_object().unwrap(),
//!     Some("default"),
//! )?;
//! ```
//!
//! # Pipeline
//!
//! 1. The template `<view_directory>/<script>.<ext>` runs with `view_*`
//!    bindings. Its output is appended to the `tmpl-content` placeholder.
//! 2. If a layout is named, `<layout_directory>/<layout>.<ext>` runs with the
//!    same bindings and its output is the result. Otherwise the result is
//!    the `tmpl-content` placeholder.
//! 3. With a static cache attached, the result is offered to the cache and
//!    a footer of HTML comments describing the attempt is appended.
//!
//! # Render state
//!
//! [`ViewEngine::render`] works on a caller-owned [`RenderContext`].
//! Placeholders are append-only, so rendering twice into the same context
//! accumulates template content. Use [`ViewEngine::render_page`], which
//! starts from a fresh context, or call [`RenderContext::reset`] between
//! renders.

use crate::config::ViewConfig;
use crate::context::RenderContext;
use crate::error::{Result, ViewError};
use crate::executor::{Bindings, ExecError, Execution, TemplateExecutor, TemplateKind};
use crate::kv::KVStore;
use crate::link;
use crate::placeholder::names;
use crate::request::RequestContext;
use crate::static_cache::{CacheOutcome, StaticCache};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Layout used when a caller does not pick one.
pub const DEFAULT_LAYOUT: &str = "default";

/// Composes templates, layouts and partials.
///
/// Cloning is cheap; clones share configuration, executor and cache.
#[derive(Clone)]
pub struct ViewEngine {
    config: Arc<ViewConfig>,
    executor: Arc<dyn TemplateExecutor>,
    static_cache: Option<StaticCache>,
}

impl fmt::Debug for ViewEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewEngine")
            .field("config", &self.config)
            .field("static_cache", &self.static_cache)
            .finish_non_exhaustive()
    }
}

impl ViewEngine {
    /// Creates an engine.
    ///
    /// # Errors
    ///
    /// [`ViewError::InvalidConfig`] if `config` does not validate.
    pub fn new<E>(config: ViewConfig, executor: E) -> Result<Self>
    where
        E: TemplateExecutor + 'static,
    {
        Self::with_executor(config, Arc::new(executor))
    }

    /// Creates an engine around a shared executor.
    pub fn with_executor(config: ViewConfig, executor: Arc<dyn TemplateExecutor>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            executor,
            static_cache: None,
        })
    }

    /// Attaches a static page cache whose write locks live in `store`.
    pub fn with_static_cache(mut self, store: Arc<dyn KVStore>) -> Self {
        self.static_cache = Some(StaticCache::new(store));
        self
    }

    /// The engine configuration.
    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    /// Whether a static cache is attached.
    pub fn has_static_cache(&self) -> bool {
        self.static_cache.is_some()
    }

    /// Path of the template named `script`.
    pub fn template_path(&self, script: &str) -> PathBuf {
        self.config
            .view_directory
            .join(format!("{}.{}", script, self.config.template_extension))
    }

    /// Path of the layout named `layout`.
    pub fn layout_path(&self, layout: &str) -> PathBuf {
        self.config
            .layout_directory
            .join(format!("{}.{}", layout, self.config.template_extension))
    }

    /// Path of the partial named `script`. No extension is added.
    pub fn partial_path(&self, script: &str) -> PathBuf {
        self.config.partials_directory.join(script)
    }

    /// Renders `script` with `data`, wrapped in `layout` when one is given.
    ///
    /// Template output is appended to the `tmpl-content` placeholder of
    /// `ctx`, which the layout reads back.
    ///
    /// # Errors
    ///
    /// - [`ViewError::TemplateExecutionFailed`] if the template or layout is
    ///   missing or fails
    /// - Placeholder errors raised by the files, unchanged
    /// - [`ViewError::CacheWriteFailed`] if the static cache cannot be
    ///   written
    pub fn render(
        &self,
        ctx: &mut RenderContext,
        script: &str,
        data: &Bindings,
        layout: Option<&str>,
    ) -> Result<String> {
        debug!(script, layout, path = %ctx.request().path(), "Rendering view");

        let template = self.execute(ctx, TemplateKind::Template, &self.template_path(script), data)?;
        ctx.set_content(names::TEMPLATE_CONTENT, &template)?;

        let mut result = match layout.filter(|l| !l.is_empty()) {
            Some(layout) => self.execute(ctx, TemplateKind::Layout, &self.layout_path(layout), data)?,
            None => ctx
                .get_content(names::TEMPLATE_CONTENT)?
                .unwrap_or_default()
                .to_string(),
        };

        if let Some(cache) = &self.static_cache {
            let outcome = cache.write(&self.config, ctx.request(), &result)?;
            let location = StaticCache::location(&self.config, ctx.request());
            result.push_str(&StaticCache::footer(&location, outcome.written()));
        }

        Ok(result)
    }

    /// Renders a page for `request` in a fresh [`RenderContext`].
    pub fn render_page(
        &self,
        request: RequestContext,
        script: &str,
        data: &Bindings,
        layout: Option<&str>,
    ) -> Result<String> {
        let mut ctx = RenderContext::new(request);
        self.render(&mut ctx, script, data, layout)
    }

    /// Renders the partial `script` with `data` and returns its output.
    ///
    /// `script` may contain subdirectories, e.g. `nested/widget`.
    pub fn partial(&self, ctx: &mut RenderContext, script: &str, data: &Bindings) -> Result<String> {
        self.execute(ctx, TemplateKind::Partial, &self.partial_path(script), data)
    }

    /// Builds a URL from the request. See [`link::build_link`].
    pub fn link<I, K, V>(
        &self,
        request: &RequestContext,
        query: I,
        path: Option<&str>,
        host: Option<&str>,
    ) -> String
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        link::build_link(request, query, path, host)
    }

    /// Prefixes a resource path with a host. See [`link::prefix_host`].
    pub fn prefix_host(&self, request: &RequestContext, resource_path: &str, host: Option<&str>) -> String {
        link::prefix_host(request, resource_path, host)
    }

    /// Writes `content` to the static cache for `request`.
    ///
    /// Returns whether the file was written. Always `false` when no static
    /// cache is attached or caching is disabled.
    pub fn cache(&self, request: &RequestContext, content: &str) -> Result<bool> {
        Ok(self.cache_outcome(request, content)?.written())
    }

    /// Like [`ViewEngine::cache`], reporting why nothing was written.
    pub fn cache_outcome(&self, request: &RequestContext, content: &str) -> Result<CacheOutcome> {
        match &self.static_cache {
            Some(cache) => cache.write(&self.config, request, content),
            None => Ok(CacheOutcome::Disabled),
        }
    }

    fn execute(
        &self,
        ctx: &mut RenderContext,
        kind: TemplateKind,
        path: &Path,
        bindings: &Bindings,
    ) -> Result<String> {
        debug!(%kind, path = %path.display(), depth = ctx.depth(), "Executing");

        let execution = Execution { kind, path, bindings };
        ctx.push_frame();
        let executed = self.executor.execute(self, &execution, ctx);
        // The frame is closed even when execution failed
        let output = ctx.pop_frame();

        let failed = |reason: String| ViewError::TemplateExecutionFailed {
            kind,
            path: path.display().to_string(),
            reason,
        };
        match executed {
            Ok(()) => output.map_err(|e| failed(e.to_string())),
            Err(ExecError::View(e)) => Err(e),
            Err(ExecError::NotFound) => Err(failed("file not found".to_string())),
            Err(ExecError::Failed(reason)) => Err(failed(reason)),
        }
    }
}
