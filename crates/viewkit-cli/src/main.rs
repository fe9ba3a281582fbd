// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use viewkit_cli::commands::{self, link::LinkOptions, render::RenderOptions};

#[derive(Parser)]
#[command(name = "viewkit")]
#[command(author = "Maravilla Labs")]
#[command(version)]
#[command(about = "Render Lua views, layouts and partials", long_about = None)]
struct Cli {
    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Project directory containing viewkit.toml
    #[arg(short = 'C', long, global = true, default_value = ".")]
    project: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new viewkit project
    Init {
        /// Project name (defaults to current directory name)
        name: Option<String>,
    },
    /// Render a view
    Render {
        /// View name, relative to the view directory and without extension
        script: String,
        /// JSON file with the view data
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Set a single value (KEY=VALUE, VALUE parsed as JSON when possible)
        #[arg(short, long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
        /// Layout to render into
        #[arg(short, long, default_value = viewkit::DEFAULT_LAYOUT, conflicts_with = "no_layout")]
        layout: String,
        /// Render the view without a layout
        #[arg(long)]
        no_layout: bool,
        /// Request URI the view is rendered for
        #[arg(long, default_value = "/")]
        url: String,
        /// Request host
        #[arg(long)]
        host: Option<String>,
        /// Write the result to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Build a link from a request URI
    Link {
        /// Request URI to start from
        #[arg(long, default_value = "/")]
        url: String,
        /// Query override (KEY=VALUE)
        #[arg(short, long, value_name = "KEY=VALUE")]
        query: Vec<String>,
        /// Path override
        #[arg(long)]
        path: Option<String>,
        /// Host override
        #[arg(long)]
        host: Option<String>,
    },
    /// Print the effective view configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with the specified log level
    let filter = EnvFilter::try_new(&cli.log_level)
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init { name } => commands::init::run(name),
        Commands::Render {
            script,
            data,
            set,
            layout,
            no_layout,
            url,
            host,
            output,
        } => commands::render::run(
            &cli.project,
            RenderOptions {
                script,
                data_file: data,
                set,
                layout: (!no_layout).then_some(layout),
                url,
                host,
            },
            output.as_deref(),
        ),
        Commands::Link { url, query, path, host } => {
            commands::link::run(LinkOptions { url, query, path, host })
        }
        Commands::Config => commands::config::run(&cli.project),
    }
}
