// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

// Warn on missing documentation for public items
#![warn(missing_docs)]

//! # viewkit
//!
//! Server-side view rendering with layouts, partials, placeholders and an
//! optional static page cache.
//!
//! ## Features
//!
//! - Templates wrapped in layouts, with content handed over through named
//!   placeholders
//! - Partials with their own scoped bindings
//! - Request-scoped render state, safe to use from many threads at once
//! - Static page cache guarded by a short-lived write lock in a shared
//!   key-value store
//! - URL helpers that rebuild the current request URL with overrides
//! - A sandboxed Lua executor, or any executor of your own
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use viewkit::{FileSystemResolver, LuaExecutor, RequestContext, ViewConfig, ViewEngine};
//!
//! let executor = LuaExecutor::new(FileSystemResolver::new().with_root("./site"));
//! let engine = ViewEngine::new(ViewConfig::default(), executor)?;
//!
//! let data = serde_json::json!({ "title": "Home" });
//! let data = data.as_object().cloned().unwrap_or_default();
//! let html = engine.render_page(RequestContext::new("/"), "index", &data, Some("default"))?;
//! # Ok::<(), viewkit::ViewError>(())
//! ```

/// View configuration.
pub mod config;
/// Per-request render state.
pub mod context;
/// Template, layout and partial composition.
pub mod engine;
/// Error types.
pub mod error;
/// The template executor seam.
pub mod executor;
/// Key-value store used for cache write locks.
pub mod kv;
/// URL building from the current request.
pub mod link;
/// Lua template execution.
pub mod lua_executor;
/// Named content placeholders.
pub mod placeholder;
/// HTTP request context.
pub mod request;
/// Template source resolution.
pub mod resolver;
/// Static page cache.
pub mod static_cache;

pub use config::{ConfigOverrides, ViewConfig};
pub use context::RenderContext;
pub use engine::{ViewEngine, DEFAULT_LAYOUT};
pub use error::{Result, ViewError};
pub use executor::{Bindings, ExecError, Execution, TemplateExecutor, TemplateKind};
pub use kv::{KVError, KVResult, KVStore, MemoryKVStore, PutOptions};
pub use lua_executor::LuaExecutor;
pub use placeholder::PlaceholderStore;
pub use request::RequestContext;
pub use resolver::{FileSystemResolver, MemoryResourceResolver, ResolvedResource, ResourceResolver};
pub use static_cache::{CacheOutcome, StaticCache};
