// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! CLI command implementations.
//!
//! This module contains the implementations for all viewkit CLI commands:
//!
//! - `config`: Print the effective view configuration
//! - `init`: Initialize a new viewkit project
//! - `link`: Build a link from a request URI
//! - `render`: Render a view, optionally into a layout and the static cache

/// Effective configuration command.
pub mod config;
/// Project initialization command.
pub mod init;
/// Link building command.
pub mod link;
/// View rendering command.
pub mod render;

/// Splits a `KEY=VALUE` argument.
pub(crate) fn parse_pair(arg: &str) -> anyhow::Result<(String, String)> {
    match arg.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => anyhow::bail!("Expected KEY=VALUE, got '{}'", arg),
    }
}
