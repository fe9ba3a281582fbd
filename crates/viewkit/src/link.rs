// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! URL building from the current request.
//!
//! [`build_link`] rebuilds the current URL with query, path and host
//! overrides. [`prefix_host`] turns a resource path into a
//! protocol-relative URL.

use crate::request::RequestContext;

/// Query parameter used to force a static cache write. It is never carried
/// over into generated links.
pub const CACHE_WRITE_PARAM: &str = "cachewrite";

/// Builds a URL from the current request.
///
/// Existing query parameters are kept in their original order, overrides
/// replace values in place and new keys are appended. `path` and `host`
/// replace the request path and add a host prefix when given and non-empty.
/// Without a host override the result is a relative URL.
///
/// # Example
///
/// ```rust
/// use viewkit::{link::build_link, RequestContext};
///
/// let request = RequestContext::new("/page?q=1&r=5");
/// assert_eq!(build_link(&request, [("q", "2")], None, None), "/page?q=2&r=5");
/// ```
pub fn build_link<I, K, V>(
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
    let mut params = request.query_pairs();
    params.retain(|(key, _)| key != CACHE_WRITE_PARAM);

    for (key, value) in query {
        let key = key.into();
        let value = value.into();
        match params.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => params.push((key, value)),
        }
    }

    let query_string = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter())
        .finish();

    let path = path.filter(|p| !p.is_empty()).unwrap_or_else(|| request.path());
    let host = host.filter(|h| !h.is_empty()).unwrap_or_default();

    let mut link = String::with_capacity(host.len() + path.len() + query_string.len() + 1);
    link.push_str(host);
    link.push_str(path);
    if !query_string.is_empty() {
        link.push('?');
        link.push_str(&query_string);
    }
    link
}

/// Prefixes `resource_path` with `//` and a host.
///
/// Uses `host` when given, otherwise the request's host. Returns the path
/// unchanged when no host is known.
pub fn prefix_host(request: &RequestContext, resource_path: &str, host: Option<&str>) -> String {
    match host.filter(|h| !h.is_empty()).or_else(|| request.host()) {
        Some(host) => format!("//{}{}", host, resource_path),
        None => resource_path.to_string(),
    }
}
