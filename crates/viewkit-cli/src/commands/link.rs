// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Link building command.

use crate::commands::parse_pair;
use viewkit::link::build_link;
use viewkit::RequestContext;

/// Link arguments.
#[derive(Debug, Clone, Default)]
pub struct LinkOptions {
    /// Request URI to start from.
    pub url: String,
    /// `KEY=VALUE` query overrides.
    pub query: Vec<String>,
    /// Path override.
    pub path: Option<String>,
    /// Host override.
    pub host: Option<String>,
}

/// Prints the link.
pub fn run(options: LinkOptions) -> anyhow::Result<()> {
    println!("{}", build(&options)?);
    Ok(())
}

/// Builds the link for `options`.
pub fn build(options: &LinkOptions) -> anyhow::Result<String> {
    let request = RequestContext::new(options.url.as_str());
    let query = options
        .query
        .iter()
        .map(|pair| parse_pair(pair))
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(build_link(
        &request,
        query,
        options.path.as_deref(),
        options.host.as_deref(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build() {
        let options = LinkOptions {
            url: "/page?q=1&r=5&cachewrite=1".to_string(),
            query: vec!["q=2".to_string()],
            ..Default::default()
        };
        assert_eq!(build(&options).unwrap(), "/page?q=2&r=5");

        let options = LinkOptions {
            url: "/page".to_string(),
            query: vec!["broken".to_string()],
            ..Default::default()
        };
        assert!(build(&options).is_err());
    }
}
