// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Per-request render state.
//!
//! A [`RenderContext`] belongs to exactly one top-level render. It owns the
//! [`PlaceholderStore`], the request being served and a stack of output
//! frames. Each template, layout or partial execution writes into its own
//! frame, which the engine reads back when the execution ends.
//!
//! # Output routing
//!
//! [`RenderContext::write`] sends text to the active capture if the capture
//! was opened while the current frame was on top. Otherwise the text goes to
//! the innermost frame. A partial rendered in the middle of a capture
//! therefore still returns its own output to the caller, who decides whether
//! to write it into the capture.
//!
//! Text written while no frame is open collects in a root buffer, available
//! through [`RenderContext::take_output`].

use crate::error::{Result, ViewError};
use crate::placeholder::PlaceholderStore;
use crate::request::RequestContext;

/// Request-scoped render state shared by templates, layouts and partials.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    placeholders: PlaceholderStore,
    request: RequestContext,
    frames: Vec<String>,
    root: String,
    /// Frame depth at which the active capture was opened.
    capture_depth: Option<usize>,
}

impl RenderContext {
    /// Creates a context for the given request.
    pub fn new(request: RequestContext) -> Self {
        Self {
            request,
            ..Self::default()
        }
    }

    /// The request being rendered.
    pub fn request(&self) -> &RequestContext {
        &self.request
    }

    /// The placeholder store.
    pub fn placeholders(&self) -> &PlaceholderStore {
        &self.placeholders
    }

    /// Mutable access to the placeholder store.
    ///
    /// Captures should be driven through [`RenderContext::capture_start`]
    /// and [`RenderContext::capture_end`] so output is routed correctly.
    pub fn placeholders_mut(&mut self) -> &mut PlaceholderStore {
        &mut self.placeholders
    }

    /// Writes template output.
    pub fn write(&mut self, text: &str) {
        if self.capture_depth == Some(self.frames.len()) && self.placeholders.write(text) {
            return;
        }
        match self.frames.last_mut() {
            Some(frame) => frame.push_str(text),
            None => self.root.push_str(text),
        }
    }

    /// Starts capturing output into the named placeholder.
    pub fn capture_start(&mut self, name: &str) -> Result<()> {
        self.placeholders.capture_start(name)?;
        self.capture_depth = Some(self.frames.len());
        Ok(())
    }

    /// Ends the active capture and stores what it collected.
    pub fn capture_end(&mut self) -> Result<()> {
        self.placeholders.capture_end()?;
        self.capture_depth = None;
        Ok(())
    }

    /// Appends content to a placeholder.
    pub fn set_content(&mut self, name: &str, content: &str) -> Result<()> {
        self.placeholders.set_content(name, content)
    }

    /// Returns a placeholder's content, `None` if it was never written.
    pub fn get_content(&self, name: &str) -> Result<Option<&str>> {
        self.placeholders.get_content(name)
    }

    /// Removes a placeholder.
    pub fn delete_content(&mut self, name: &str) -> Result<()> {
        self.placeholders.delete_content(name)
    }

    /// Opens a new output frame.
    pub(crate) fn push_frame(&mut self) {
        self.frames.push(String::new());
    }

    /// Closes the innermost output frame and returns its text.
    ///
    /// Fails with [`ViewError::UnclosedCapture`] if a capture opened inside
    /// this frame is still active. The frame is closed and the capture
    /// discarded either way.
    pub(crate) fn pop_frame(&mut self) -> Result<String> {
        let unclosed = if self.capture_depth == Some(self.frames.len()) {
            self.capture_depth = None;
            self.placeholders.abort_capture()
        } else {
            None
        };
        let text = self.frames.pop().unwrap_or_default();

        match unclosed {
            Some(name) => Err(ViewError::UnclosedCapture { name }),
            None => Ok(text),
        }
    }

    /// Number of output frames currently open.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Takes the text written while no frame was open.
    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.root)
    }

    /// Clears placeholders, frames and any open capture, keeping the request.
    pub fn reset(&mut self) {
        self.placeholders.clear();
        self.frames.clear();
        self.root.clear();
        self.capture_depth = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_go_to_innermost_frame() {
        let mut ctx = RenderContext::default();
        ctx.push_frame();
        ctx.write("outer ");
        ctx.push_frame();
        ctx.write("inner");

        assert_eq!(ctx.pop_frame().unwrap(), "inner");
        ctx.write("again");
        assert_eq!(ctx.pop_frame().unwrap(), "outer again");
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn test_capture_takes_output_of_its_frame() {
        let mut ctx = RenderContext::default();
        ctx.push_frame();
        ctx.write("<p>body</p>");
        ctx.capture_start("meta-title").unwrap();
        ctx.write("Title");
        ctx.capture_end().unwrap();
        ctx.write("<p>more</p>");

        assert_eq!(ctx.pop_frame().unwrap(), "<p>body</p><p>more</p>");
        assert_eq!(ctx.get_content("meta-title").unwrap(), Some("Title"));
    }

    #[test]
    fn test_partial_frame_inside_capture_keeps_its_output() {
        let mut ctx = RenderContext::default();
        ctx.push_frame();
        ctx.capture_start("footer-content").unwrap();

        // A partial rendered during the capture
        ctx.push_frame();
        ctx.write("<nav/>");
        let partial = ctx.pop_frame().unwrap();
        assert_eq!(partial, "<nav/>");

        // The template writes the partial's output into the capture
        ctx.write(&partial);
        ctx.capture_end().unwrap();

        assert_eq!(ctx.pop_frame().unwrap(), "");
        assert_eq!(ctx.get_content("footer-content").unwrap(), Some("<nav/>"));
    }

    #[test]
    fn test_unclosed_capture_fails_frame() {
        let mut ctx = RenderContext::default();
        ctx.push_frame();
        ctx.capture_start("head-content").unwrap();
        ctx.write("<style/>");

        assert_eq!(
            ctx.pop_frame().unwrap_err(),
            ViewError::UnclosedCapture { name: "head-content".to_string() }
        );
        assert!(!ctx.placeholders().is_capturing());
        assert_eq!(ctx.get_content("head-content").unwrap(), None);
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn test_root_output() {
        let mut ctx = RenderContext::default();
        ctx.write("loose");
        assert_eq!(ctx.take_output(), "loose");
        assert_eq!(ctx.take_output(), "");
    }

    #[test]
    fn test_reset_keeps_request() {
        let mut ctx = RenderContext::new(RequestContext::new("/about"));
        ctx.set_content("a", "1").unwrap();
        ctx.push_frame();
        ctx.capture_start("b").unwrap();
        ctx.reset();

        assert_eq!(ctx.get_content("a").unwrap(), None);
        assert!(!ctx.placeholders().is_capturing());
        assert_eq!(ctx.depth(), 0);
        assert_eq!(ctx.request().path(), "/about");
    }
}
