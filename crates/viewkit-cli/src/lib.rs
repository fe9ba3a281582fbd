// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

// Warn on missing documentation for public items
#![warn(missing_docs)]

//! viewkit CLI library.
//!
//! This crate provides the command-line interface for the viewkit view
//! renderer.
//!
//! # Usage
//!
//! This crate is primarily used through the `viewkit` binary:
//!
//! ```bash
//! viewkit init my-site                  # Scaffold a new project
//! viewkit render index --set title=Hi   # Render views/index.lua in the default layout
//! viewkit link --url "/p?q=1" --query q=2
//! viewkit config                        # Print the effective view configuration
//! ```
//!
//! # Configuration
//!
//! Projects are configured via `viewkit.toml` at the project root.

/// CLI commands (init, render, link, config).
pub mod commands;
/// Project configuration from `viewkit.toml`.
pub mod config;
/// Key-Value store with SQLite backend.
pub mod kv;
