// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Named content placeholders.
//!
//! A placeholder is an append-only text slot that templates fill while they
//! render and that layouts read back to assemble the final page. Content can
//! be captured from template output ([`PlaceholderStore::capture_start`] /
//! [`PlaceholderStore::capture_end`]) or appended directly
//! ([`PlaceholderStore::set_content`]).
//!
//! Captures are additive. To replace content, delete it first.
//!
//! Only one capture can be open at a time. Nested captures are rejected with
//! [`ViewError::CaptureAlreadyActive`].
//!
//! # Example
//!
//! ```rust
//! use viewkit::placeholder::{names, PlaceholderStore};
//!
//! let mut store = PlaceholderStore::new();
//! store.capture_start(names::META_TITLE)?;
//! store.write("Home");
//! store.capture_end()?;
//! store.set_content(names::META_TITLE, " | Site")?;
//!
//! assert_eq!(store.get_content(names::META_TITLE)?, Some("Home | Site"));
//! # Ok::<(), viewkit::ViewError>(())
//! ```

use crate::error::{Result, ViewError};
use std::collections::HashMap;

/// Well-known placeholder names used by the render pipeline and by
/// convention between templates and layouts.
///
/// These are plain string keys. Templates are free to use any other name.
pub mod names {
    /// The main content of a rendered template, read back by layouts.
    pub const TEMPLATE_CONTENT: &str = "tmpl-content";
    /// Content placed in the `<head>` of the page.
    pub const HEAD_CONTENT: &str = "head-content";
    /// Content placed at the bottom of the page, after all html and before
    /// scripts.
    pub const FOOTER_CONTENT: &str = "footer-content";
    /// Inline scripts included at the bottom of the page, wrapped in
    /// `<script>` tags.
    pub const INLINE_SCRIPTS: &str = "inline-scripts";
    /// The id applied to the body element.
    pub const PAGE_ID: &str = "page-id";
    /// The class applied to the body element.
    pub const PAGE_CLASS: &str = "page-class";
    /// The page title.
    pub const META_TITLE: &str = "meta-title";
    /// The meta description.
    pub const META_DESCRIPTION: &str = "meta-description";
    /// The meta keywords.
    pub const META_KEYWORDS: &str = "meta-keywords";
    /// The image shared by social and link-preview sites.
    pub const META_IMAGE: &str = "meta-image";

    /// Every reserved name, paired with the constant name exposed to Lua.
    pub const ALL: [(&str, &str); 10] = [
        ("TMPL_CONTENT", TEMPLATE_CONTENT),
        ("HEAD_CONTENT", HEAD_CONTENT),
        ("FOOTER_CONTENT", FOOTER_CONTENT),
        ("INLINE_SCRIPTS", INLINE_SCRIPTS),
        ("PAGE_ID", PAGE_ID),
        ("PAGE_CLASS", PAGE_CLASS),
        ("META_TITLE", META_TITLE),
        ("META_DESCRIPTION", META_DESCRIPTION),
        ("META_KEYWORDS", META_KEYWORDS),
        ("META_IMAGE", META_IMAGE),
    ];
}

#[derive(Debug, Clone)]
struct ActiveCapture {
    name: String,
    buffer: String,
}

/// Keyed text accumulator with a single active-capture slot.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderStore {
    content: HashMap<String, String>,
    active: Option<ActiveCapture>,
}

fn check_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ViewError::invalid_placeholder_name());
    }
    Ok(())
}

impl PlaceholderStore {
    /// Creates an empty store with no capture open.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts capturing output for `name`.
    ///
    /// # Errors
    ///
    /// - [`ViewError::InvalidArgument`] if `name` is empty
    /// - [`ViewError::CaptureAlreadyActive`] if another capture is open
    pub fn capture_start(&mut self, name: &str) -> Result<()> {
        check_name(name)?;
        if let Some(active) = &self.active {
            return Err(ViewError::CaptureAlreadyActive {
                active: active.name.clone(),
                requested: name.to_string(),
            });
        }
        self.active = Some(ActiveCapture {
            name: name.to_string(),
            buffer: String::new(),
        });
        Ok(())
    }

    /// Closes the active capture and appends what it collected to the
    /// placeholder, creating the entry if needed.
    ///
    /// # Errors
    ///
    /// [`ViewError::NoActiveCapture`] if nothing is being captured.
    pub fn capture_end(&mut self) -> Result<()> {
        let active = self.active.take().ok_or(ViewError::NoActiveCapture)?;
        self.content
            .entry(active.name)
            .or_default()
            .push_str(&active.buffer);
        Ok(())
    }

    /// Appends `text` to the active capture.
    ///
    /// Returns `false` (and drops nothing) if no capture is open, so the
    /// caller can route the text elsewhere.
    pub fn write(&mut self, text: &str) -> bool {
        match &mut self.active {
            Some(active) => {
                active.buffer.push_str(text);
                true
            }
            None => false,
        }
    }

    /// Appends `content` to the placeholder without going through a capture.
    pub fn set_content(&mut self, name: &str, content: &str) -> Result<()> {
        check_name(name)?;
        self.content
            .entry(name.to_string())
            .or_default()
            .push_str(content);
        Ok(())
    }

    /// Returns the accumulated content, or `None` if `name` was never
    /// written (or has been deleted).
    pub fn get_content(&self, name: &str) -> Result<Option<&str>> {
        check_name(name)?;
        Ok(self.content.get(name).map(String::as_str))
    }

    /// Removes the placeholder entirely. Removing a missing name is not an
    /// error.
    pub fn delete_content(&mut self, name: &str) -> Result<()> {
        check_name(name)?;
        self.content.remove(name);
        Ok(())
    }

    /// The name of the capture currently open, if any.
    pub fn active_capture(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.name.as_str())
    }

    /// Whether a capture is open.
    pub fn is_capturing(&self) -> bool {
        self.active.is_some()
    }

    /// Iterates over the names that currently hold content.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.content.keys().map(String::as_str)
    }

    /// Drops every placeholder and any open capture.
    pub fn clear(&mut self) {
        self.content.clear();
        self.active = None;
    }

    /// Discards the open capture without storing it, returning its name.
    pub(crate) fn abort_capture(&mut self) -> Option<String> {
        self.active.take().map(|a| a.name)
    }
}
