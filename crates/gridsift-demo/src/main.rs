//! `gridsift` - run column filters over a row collection from the command line.
//!
//! Rows come from a JSON file (`--data`) or a built-in sample. Engine
//! options can be overridden with a YAML file (`--config`).
//!
//! ```text
//! gridsift schema
//! gridsift distinct category
//! gridsift tree created_date --search 2024-01
//! gridsift filter --where "price:>=:15" --exclude "category=Category 3"
//! ```

mod cli;
mod commands;
mod data;

use anyhow::Result;
use clap::Parser;

use crate::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    commands::run(cli)
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "info,gridsift=debug",
        _ => "debug,gridsift=trace",
    };
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string());

    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .with_env_filter(filter)
        .init();
}
