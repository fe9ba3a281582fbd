// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Request context consumed by link building and cache path derivation.
//!
//! This module provides a platform-agnostic view of the current request that
//! HTTP adapters fill in before rendering. Only the parts the view layer
//! needs are kept: the request target (path and query) and the host.

use std::collections::HashMap;

/// The request currently being rendered.
///
/// # Example
///
/// ```rust
/// use viewkit::RequestContext;
///
/// let request = RequestContext::new("/blog/hello?page=2").with_host("example.com");
/// assert_eq!(request.path(), "/blog/hello");
/// assert_eq!(request.query_string(), Some("page=2"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// The request target as received (e.g. `/blog/hello?page=2`).
    pub uri: String,

    /// The `Host` header, if known.
    pub host: Option<String>,

    /// Other request headers.
    pub headers: HashMap<String, String>,
}

impl RequestContext {
    /// Creates a request context for the given request target.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            host: None,
            headers: HashMap::new(),
        }
    }

    /// Sets the host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Adds headers to the request.
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// The request target without any fragment.
    fn target(&self) -> &str {
        let uri = self.uri.as_str();
        let uri = uri.split('#').next().unwrap_or_default();
        // Absolute-form targets carry a scheme and authority we don't need.
        // Only a `://` ahead of the query counts, query values may hold URLs.
        let head_end = uri.find('?').unwrap_or(uri.len());
        match uri[..head_end].find("://") {
            Some(idx) if !uri.starts_with('/') => {
                let rest = &uri[idx + 3..];
                rest.find(['/', '?']).map(|pos| &rest[pos..]).unwrap_or_default()
            }
            _ => uri,
        }
    }

    /// The path component, `/` when the target is empty.
    pub fn path(&self) -> &str {
        let path = self.target().split('?').next().unwrap_or_default();
        if path.is_empty() {
            "/"
        } else {
            path
        }
    }

    /// The raw query string, without the leading `?`.
    pub fn query_string(&self) -> Option<&str> {
        self.target()
            .split_once('?')
            .map(|(_, query)| query)
            .filter(|query| !query.is_empty())
    }

    /// Decoded query parameters in order of first appearance.
    ///
    /// A key that appears more than once keeps its first position and its
    /// last value.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = Vec::new();
        let Some(query) = self.query_string() else {
            return pairs;
        };
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match pairs.iter_mut().find(|(k, _)| *k == key) {
                Some(existing) => existing.1 = value.into_owned(),
                None => pairs.push((key.into_owned(), value.into_owned())),
            }
        }
        pairs
    }

    /// The host, falling back to the `Host` header.
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref().or_else(|| {
            self.headers
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case("host"))
                .map(|(_, value)| value.as_str())
        })
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_and_query() {
        let req = RequestContext::new("/page?q=1&r=5");
        assert_eq!(req.path(), "/page");
        assert_eq!(req.query_string(), Some("q=1&r=5"));
        assert_eq!(
            req.query_pairs(),
            vec![("q".to_string(), "1".to_string()), ("r".to_string(), "5".to_string())]
        );
    }

    #[test]
    fn test_fragment_is_ignored() {
        let req = RequestContext::new("/docs?section=2#intro");
        assert_eq!(req.path(), "/docs");
        assert_eq!(req.query_string(), Some("section=2"));
    }

    #[test]
    fn test_absolute_form_target() {
        let req = RequestContext::new("https://example.com/a/b?x=1");
        assert_eq!(req.path(), "/a/b");
        assert_eq!(req.query_string(), Some("x=1"));
    }

    #[test]
    fn test_url_in_query_value_is_not_the_target() {
        let req = RequestContext::new("/login?next=https://example.com/admin");
        assert_eq!(req.path(), "/login");
        assert_eq!(req.query_string(), Some("next=https://example.com/admin"));
        assert_eq!(
            req.query_pairs(),
            vec![("next".to_string(), "https://example.com/admin".to_string())]
        );

        let req = RequestContext::new("https://example.com?next=http://other.org/x");
        assert_eq!(req.path(), "/");
        assert_eq!(req.query_string(), Some("next=http://other.org/x"));
    }

    #[test]
    fn test_empty_target() {
        let req = RequestContext::new("");
        assert_eq!(req.path(), "/");
        assert_eq!(req.query_string(), None);
        assert!(req.query_pairs().is_empty());
    }

    #[test]
    fn test_duplicate_keys_keep_last_value() {
        let req = RequestContext::new("/?a=1&b=2&a=3");
        assert_eq!(
            req.query_pairs(),
            vec![("a".to_string(), "3".to_string()), ("b".to_string(), "2".to_string())]
        );
    }

    #[test]
    fn test_decoding() {
        let req = RequestContext::new("/search?q=hello+world&tag=a%26b");
        assert_eq!(
            req.query_pairs(),
            vec![
                ("q".to_string(), "hello world".to_string()),
                ("tag".to_string(), "a&b".to_string())
            ]
        );
    }

    #[test]
    fn test_host_from_header() {
        let req = RequestContext::new("/")
            .with_headers([("host".to_string(), "example.org".to_string())].into());
        assert_eq!(req.host(), Some("example.org"));

        let req = RequestContext::new("/")
            .with_headers([("HOST".to_string(), "upper.org".to_string())].into());
        assert_eq!(req.host(), Some("upper.org"));

        let req = req.with_host("override.org");
        assert_eq!(req.host(), Some("override.org"));
    }
}
