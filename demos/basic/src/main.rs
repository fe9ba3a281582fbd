// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Renders a small blog page from templates held in memory.
//!
//! Run with `RUST_LOG=debug` to see the render pipeline.

use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use viewkit::{
    LuaExecutor, MemoryKVStore, MemoryResourceResolver, RequestContext, ViewConfig, ViewEngine,
};

const POST: &str = r#"
placeholder.capture_start(placeholder.META_TITLE)
echo(view_post.title, " | Demo")
placeholder.capture_end()

placeholder.capture_start(placeholder.INLINE_SCRIPTS)
echo("<script>console.log('post ", view_post.id, "')</script>")
placeholder.capture_end()

echo("<article><h1>", view_post.title, "</h1>")
for _, paragraph in ipairs(view_post.body) do
  echo("<p>", paragraph, "</p>")
end
echo(partial("tags", { tags = view_post.tags }))
echo("</article>")
"#;

const TAGS: &str = r#"
echo("<ul class=\"tags\">")
for _, tag in ipairs(parts_tags) do
  echo("<li><a href=\"", link({ tag = tag }, "/search"), "\">", tag, "</a></li>")
end
echo("</ul>")
"#;

const LAYOUT: &str = r#"
echo("<html><head><title>", placeholder.get(placeholder.META_TITLE), "</title></head>\n")
echo("<body>", placeholder.get(placeholder.TMPL_CONTENT), "\n")
echo(placeholder.get(placeholder.INLINE_SCRIPTS), "</body></html>")
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let resolver = MemoryResourceResolver::new();
    resolver.add_resource("views/blog/post.lua", POST);
    resolver.add_resource("parts/tags", TAGS);
    resolver.add_resource("layouts/default.lua", LAYOUT);

    let cache_root = std::env::temp_dir().join("viewkit-demo-cache");
    let config = ViewConfig {
        static_page_caching: true,
        static_cache_root: cache_root.clone(),
        ..ViewConfig::default()
    };
    let engine = ViewEngine::new(config, LuaExecutor::new(resolver))?
        .with_static_cache(Arc::new(MemoryKVStore::new()));

    let data = serde_json::json!({
        "post": {
            "id": 7,
            "title": "Placeholders",
            "body": ["Templates fill named slots.", "Layouts read them back."],
            "tags": ["rust", "lua"],
        }
    });
    let data = data.as_object().cloned().unwrap_or_default();

    let request = RequestContext::new("/blog/placeholders?ref=home").with_host("demo.local");
    let html = engine.render_page(request, "blog/post", &data, Some(viewkit::DEFAULT_LAYOUT))?;

    println!("{}", html);
    tracing::info!(cache = %cache_root.display(), "Done");
    Ok(())
}
