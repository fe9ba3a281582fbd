// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Error types for the viewkit rendering pipeline.
//!
//! This module defines [`ViewError`], the error enum shared by every part of
//! the crate.
//!
//! # Error Categories
//!
//! - **Argument errors**: empty or invalid placeholder names
//! - **Capture errors**: starting a second capture, ending a missing one, or
//!   leaving a capture open when a template finishes
//! - **Execution errors**: a template, layout or partial could not be found or
//!   failed while running
//! - **Cache errors**: the static cache file or its write lock could not be
//!   written
//! - **Configuration errors**: unknown option names, ill-typed values or a
//!   configuration that fails validation
//!
//! Every variant is raised at the point of violation and propagated to the
//! caller. Nothing in this crate recovers locally.

use crate::executor::TemplateKind;
use thiserror::Error;

/// The main error type for viewkit operations.
///
/// `ViewError` is `Clone` so that an error raised inside a template callback
/// can travel through the executor and come out unchanged on the other side.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    /// An argument was empty or otherwise unusable.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A capture was started while another one is still open.
    #[error(
        "You must end the current capture before starting a new one \
         ('{active}' was still active when you tried to start '{requested}')"
    )]
    CaptureAlreadyActive {
        /// The capture that is still open.
        active: String,
        /// The capture that was rejected.
        requested: String,
    },

    /// `capture_end` was called with no capture open.
    #[error("Tried to end a placeholder capture that was never started")]
    NoActiveCapture,

    /// An output frame was closed while a capture opened inside it was still
    /// active.
    #[error("Placeholder capture '{name}' was still active when its output frame closed")]
    UnclosedCapture {
        /// The capture that was left open.
        name: String,
    },

    /// A template, layout or partial could not be found or failed to run.
    #[error("Failed to execute {kind} '{path}': {reason}")]
    TemplateExecutionFailed {
        /// Which stage of the pipeline failed.
        kind: TemplateKind,
        /// The resolved file path.
        path: String,
        /// What went wrong.
        reason: String,
    },

    /// The static cache file or its write lock could not be written.
    #[error("Failed to write static cache '{path}': {reason}")]
    CacheWriteFailed {
        /// The cache file the write targeted.
        path: String,
        /// What went wrong.
        reason: String,
    },

    /// A configuration option was unknown, ill-typed or failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ViewError {
    /// Shorthand for the error raised on an empty placeholder name.
    pub(crate) fn invalid_placeholder_name() -> Self {
        ViewError::InvalidArgument("You must provide a valid placeholder name".to_string())
    }
}

/// Convenience type alias for Results with [`ViewError`].
pub type Result<T> = std::result::Result<T, ViewError>;
