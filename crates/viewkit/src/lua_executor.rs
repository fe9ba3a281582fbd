// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Lua template execution.
//!
//! [`LuaExecutor`] runs every template, layout and partial as a Lua 5.4
//! chunk in a fresh, sandboxed state. Output is produced with `echo`.
//!
//! # Globals
//!
//! ```lua
//! -- Injected data
//! echo(view_title)            -- templates and layouts
//! echo(parts_items[1])        -- partials
//!
//! -- Output
//! echo("<p>", count, "</p>")  -- tostring of every non-nil argument
//!
//! -- Placeholders
//! placeholder.capture_start(placeholder.META_TITLE)
//! echo("About us")
//! placeholder.capture_end()
//! placeholder.set("sidebar", "<aside/>")
//! local body = placeholder.get(placeholder.TMPL_CONTENT)  -- nil if never written
//! placeholder.delete("sidebar")
//!
//! -- Partials and links
//! echo(partial("nav/main", { active = "home" }))
//! echo(link({ page = 2 }))
//! echo(prefix_host("/img/logo.png"))
//!
//! -- Request
//! echo(request.path, request.query_string, request.host)
//! ```
//!
//! # Sandbox
//!
//! `io`, `debug`, `load`, `loadstring`, `loadfile` and `dofile` are removed,
//! `os` is reduced to `date`, `time`, `clock` and `difftime`, and the module
//! search paths are emptied.

use crate::context::RenderContext;
use crate::engine::ViewEngine;
use crate::error::ViewError;
use crate::executor::{Bindings, ExecError, Execution, TemplateExecutor};
use crate::link;
use crate::placeholder::names;
use crate::request::RequestContext;
use crate::resolver::{ResolvedResource, ResourceResolver};
use mlua::{DeserializeOptions, Function, Lua, LuaSerdeExt, SerializeOptions, Table, Value, Variadic};
use serde_json::Value as JsonValue;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

type SharedContext = Arc<Mutex<RenderContext>>;

/// Runs template files as Lua chunks.
#[derive(Debug, Clone, Default)]
pub struct LuaExecutor<R: ResourceResolver> {
    resolver: R,
}

impl<R: ResourceResolver> LuaExecutor<R> {
    /// Creates an executor loading sources through `resolver`.
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    /// The resolver sources are loaded through.
    pub fn resolver(&self) -> &R {
        &self.resolver
    }
}

impl<R: ResourceResolver> TemplateExecutor for LuaExecutor<R> {
    fn execute(
        &self,
        engine: &ViewEngine,
        execution: &Execution<'_>,
        ctx: &mut RenderContext,
    ) -> Result<(), ExecError> {
        let resource = self.resolver.resolve(execution.path)?;
        debug!(kind = %execution.kind, path = %resource.path, "Running Lua chunk");

        // Callbacks need owned access to the context, so it is lent to the
        // Lua state for the duration of the chunk.
        let request = ctx.request().clone();
        let shared: SharedContext = Arc::new(Mutex::new(std::mem::take(ctx)));
        let outcome = run_chunk(engine, execution, &resource, &request, &shared);
        *ctx = match shared.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };
        outcome
    }
}

fn run_chunk(
    engine: &ViewEngine,
    execution: &Execution<'_>,
    resource: &ResolvedResource,
    request: &RequestContext,
    shared: &SharedContext,
) -> Result<(), ExecError> {
    let lua = Lua::new();
    install_globals(&lua, engine, execution, request, shared)
        .map_err(|e| ExecError::Failed(format!("cannot prepare Lua state: {}", e)))?;

    lua.load(resource.source.as_str())
        .set_name(format!("@{}", resource.path))
        .exec()
        .map_err(|err| match view_error(&err) {
            Some(view_err) => ExecError::View(view_err),
            None => ExecError::Failed(err.to_string()),
        })
}

/// Finds a [`ViewError`] raised by one of our callbacks inside a Lua error.
fn view_error(err: &mlua::Error) -> Option<ViewError> {
    match err {
        mlua::Error::CallbackError { cause, .. } => view_error(cause),
        mlua::Error::WithContext { cause, .. } => view_error(cause),
        mlua::Error::ExternalError(inner) => inner.downcast_ref::<ViewError>().cloned(),
        _ => None,
    }
}

fn lock(shared: &SharedContext) -> mlua::Result<MutexGuard<'_, RenderContext>> {
    shared
        .lock()
        .map_err(|_| mlua::Error::runtime("render context lock poisoned"))
}

fn sandbox_lua(lua: &Lua, globals: &Table) -> mlua::Result<()> {
    let os_table: Table = globals.get("os")?;
    let safe_os = lua.create_table()?;
    for name in ["date", "time", "clock", "difftime"] {
        safe_os.set(name, os_table.get::<Function>(name)?)?;
    }

    globals.set("io", Value::Nil)?;
    globals.set("debug", Value::Nil)?;
    globals.set("load", Value::Nil)?;
    globals.set("loadstring", Value::Nil)?;
    globals.set("loadfile", Value::Nil)?;
    globals.set("dofile", Value::Nil)?;
    globals.set("os", safe_os)?;

    if let Ok(package) = globals.get::<Table>("package") {
        package.set("path", "")?;
        package.set("cpath", "")?;
    }
    Ok(())
}

fn install_globals(
    lua: &Lua,
    engine: &ViewEngine,
    execution: &Execution<'_>,
    request: &RequestContext,
    shared: &SharedContext,
) -> mlua::Result<()> {
    let globals = lua.globals();
    sandbox_lua(lua, &globals)?;

    // JSON null becomes nil rather than a null sentinel
    let options = SerializeOptions::new()
        .serialize_none_to_null(false)
        .serialize_unit_to_null(false);
    for (name, value) in execution.prefixed_bindings() {
        globals.set(name, lua.to_value_with(value, options)?)?;
    }

    let ctx = shared.clone();
    globals.set(
        "echo",
        lua.create_function(move |lua, args: Variadic<Value>| {
            let tostring: Function = lua.globals().get("tostring")?;
            let mut text = String::new();
            for arg in args.iter().filter(|arg| !arg.is_nil()) {
                let piece: mlua::String = tostring.call(arg.clone())?;
                text.push_str(&piece.to_str()?);
            }
            lock(&ctx)?.write(&text);
            Ok(())
        })?,
    )?;

    globals.set("placeholder", placeholder_table(lua, shared)?)?;

    let ctx = shared.clone();
    let partial_engine = engine.clone();
    globals.set(
        "partial",
        lua.create_function(move |lua, (script, data): (String, Option<Value>)| {
            let bindings = lua_bindings(lua, data)?;
            let mut ctx = lock(&ctx)?;
            partial_engine
                .partial(&mut ctx, &script, &bindings)
                .map_err(mlua::Error::external)
        })?,
    )?;

    let link_request = request.clone();
    globals.set(
        "link",
        lua.create_function(
            move |_, (query, path, host): (Option<Table>, Option<String>, Option<String>)| {
                let mut overrides = Vec::new();
                if let Some(query) = query {
                    for pair in query.pairs::<String, String>() {
                        overrides.push(pair?);
                    }
                }
                // Table iteration order is unspecified
                overrides.sort();
                Ok(link::build_link(
                    &link_request,
                    overrides,
                    path.as_deref(),
                    host.as_deref(),
                ))
            },
        )?,
    )?;

    let host_request = request.clone();
    globals.set(
        "prefix_host",
        lua.create_function(move |_, (resource_path, host): (String, Option<String>)| {
            Ok(link::prefix_host(&host_request, &resource_path, host.as_deref()))
        })?,
    )?;

    let request_table = lua.create_table()?;
    request_table.set("path", request.path())?;
    request_table.set("query_string", request.query_string())?;
    request_table.set("host", request.host())?;
    globals.set("request", request_table)?;

    Ok(())
}

fn placeholder_table(lua: &Lua, shared: &SharedContext) -> mlua::Result<Table> {
    let table = lua.create_table()?;
    for (constant, name) in names::ALL {
        table.set(constant, name)?;
    }

    let ctx = shared.clone();
    table.set(
        "capture_start",
        lua.create_function(move |_, name: String| {
            lock(&ctx)?.capture_start(&name).map_err(mlua::Error::external)
        })?,
    )?;

    let ctx = shared.clone();
    table.set(
        "capture_end",
        lua.create_function(move |_, ()| lock(&ctx)?.capture_end().map_err(mlua::Error::external))?,
    )?;

    let ctx = shared.clone();
    table.set(
        "set",
        lua.create_function(move |_, (name, content): (String, String)| {
            lock(&ctx)?
                .set_content(&name, &content)
                .map_err(mlua::Error::external)
        })?,
    )?;

    let ctx = shared.clone();
    table.set(
        "get",
        lua.create_function(move |_, name: String| {
            let ctx = lock(&ctx)?;
            let content = ctx.get_content(&name).map_err(mlua::Error::external)?;
            Ok(content.map(str::to_string))
        })?,
    )?;

    let ctx = shared.clone();
    table.set(
        "delete",
        lua.create_function(move |_, name: String| {
            lock(&ctx)?.delete_content(&name).map_err(mlua::Error::external)
        })?,
    )?;

    Ok(table)
}

/// Converts the data argument of `partial` into bindings.
fn lua_bindings(lua: &Lua, data: Option<Value>) -> mlua::Result<Bindings> {
    let Some(data) = data else {
        return Ok(Bindings::new());
    };
    // Functions and userdata in the table are skipped
    let options = DeserializeOptions::new().deny_unsupported_types(false);
    match lua.from_value_with::<JsonValue>(data, options)? {
        JsonValue::Object(map) => Ok(map),
        JsonValue::Array(items) if items.is_empty() => Ok(Bindings::new()),
        other => Err(mlua::Error::runtime(format!(
            "partial data must be a table with string keys, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewConfig;
    use crate::resolver::MemoryResourceResolver;
    use serde_json::json;

    fn engine(files: &[(&str, &str)]) -> ViewEngine {
        let resolver = MemoryResourceResolver::new();
        for (path, source) in files {
            resolver.add_resource(path, source);
        }
        ViewEngine::new(ViewConfig::default(), LuaExecutor::new(resolver)).unwrap()
    }

    fn render(engine: &ViewEngine, uri: &str, data: serde_json::Value) -> crate::Result<String> {
        let data = data.as_object().cloned().unwrap_or_default();
        engine.render_page(RequestContext::new(uri), "index", &data, None)
    }

    #[test]
    fn test_echo_and_bindings() {
        let engine = engine(&[(
            "views/index.lua",
            r#"echo("<h1>", view_title, "</h1>", view_count, view_missing, view_empty)"#,
        )]);
        let html = render(&engine, "/", json!({ "title": "Home", "count": 3, "empty": null })).unwrap();
        assert_eq!(html, "<h1>Home</h1>3");
    }

    #[test]
    fn test_nested_bindings() {
        let engine = engine(&[(
            "views/index.lua",
            r#"for _, item in ipairs(view_items) do echo("<li>", item.name, "</li>") end"#,
        )]);
        let html = render(&engine, "/", json!({ "items": [{ "name": "a" }, { "name": "b" }] })).unwrap();
        assert_eq!(html, "<li>a</li><li>b</li>");
    }

    #[test]
    fn test_placeholder_api() {
        let engine = engine(&[(
            "views/index.lua",
            r#"
            placeholder.capture_start(placeholder.META_TITLE)
            echo("About")
            placeholder.capture_end()
            placeholder.set(placeholder.META_TITLE, " | Site")
            placeholder.set("scratch", "x")
            placeholder.delete("scratch")
            echo(placeholder.get(placeholder.META_TITLE), ";", tostring(placeholder.get("scratch")))
            "#,
        )]);
        assert_eq!(render(&engine, "/", json!({})).unwrap(), "About | Site;nil");
    }

    #[test]
    fn test_placeholder_errors_are_recovered() {
        let nested = engine(&[(
            "views/index.lua",
            r#"placeholder.capture_start("a") placeholder.capture_start("b")"#,
        )]);
        assert_eq!(
            render(&nested, "/", json!({})).unwrap_err(),
            ViewError::CaptureAlreadyActive {
                active: "a".to_string(),
                requested: "b".to_string(),
            }
        );

        let unmatched = engine(&[("views/index.lua", r#"placeholder.capture_end()"#)]);
        assert_eq!(render(&unmatched, "/", json!({})).unwrap_err(), ViewError::NoActiveCapture);

        let empty_name = engine(&[("views/index.lua", r#"placeholder.get("")"#)]);
        assert!(matches!(
            render(&empty_name, "/", json!({})).unwrap_err(),
            ViewError::InvalidArgument(_)
        ));
    }

    #[test]
    fn test_partials() {
        let engine = engine(&[
            (
                "views/index.lua",
                r#"echo("[", partial("nested/widget", { foo = 1 }), "]", partial("plain"))"#,
            ),
            ("parts/nested/widget", r#"echo("foo=", parts_foo, tostring(view_foo))"#),
            ("parts/plain", r#"echo("plain")"#),
        ]);
        assert_eq!(render(&engine, "/", json!({ "foo": 9 })).unwrap(), "[foo=1nil]plain");
    }

    #[test]
    fn test_missing_partial_names_the_partial() {
        let engine = engine(&[("views/index.lua", r#"echo(partial("gone"))"#)]);
        let err = render(&engine, "/", json!({})).unwrap_err();
        assert!(matches!(
            err,
            ViewError::TemplateExecutionFailed { kind: crate::TemplateKind::Partial, ref path, .. }
                if path == "parts/gone"
        ));
    }

    #[test]
    fn test_runtime_error() {
        let engine = engine(&[("views/index.lua", r#"error("kaboom")"#)]);
        let err = render(&engine, "/", json!({})).unwrap_err();
        assert!(matches!(
            err,
            ViewError::TemplateExecutionFailed { ref reason, .. } if reason.contains("kaboom")
        ));
    }

    #[test]
    fn test_link_helpers_and_request() {
        let engine = engine(&[(
            "views/index.lua",
            r#"
            echo(link({ q = "2" }), " ", link(nil, "/other"), " ", prefix_host("/a.png"))
            echo(" ", request.path, " ", request.query_string, " ", request.host)
            "#,
        )]);
        let data = Bindings::new();
        let request = RequestContext::new("/page?q=1&r=5").with_host("example.com");
        let html = engine.render_page(request, "index", &data, None).unwrap();
        assert_eq!(
            html,
            "/page?q=2&r=5 /other?q=1&r=5 //example.com/a.png /page q=1&r=5 example.com"
        );
    }

    #[test]
    fn test_sandbox() {
        let engine = engine(&[(
            "views/index.lua",
            r#"echo(tostring(io), tostring(load), tostring(dofile), tostring(os.execute), type(os.time))"#,
        )]);
        assert_eq!(render(&engine, "/", json!({})).unwrap(), "nilnilnilnilfunction");
    }
}
