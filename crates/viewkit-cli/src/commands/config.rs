// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Effective configuration command.

use crate::config::Config;
use std::path::Path;

/// Prints the effective view configuration of the project at `root`.
pub fn run(root: &Path) -> anyhow::Result<()> {
    print!("{}", effective(root)?);
    Ok(())
}

/// The effective view configuration as TOML.
pub fn effective(root: &Path) -> anyhow::Result<String> {
    let config = Config::load(root)?;
    let view = config.view_config(root)?;
    Ok(toml::to_string_pretty(&view)?)
}
