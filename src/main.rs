//! Argos - a remote client for the Mopidy music server.
//!
//! The core turns library lookups into ordered album descriptions and fits
//! cover art into square album icons. Album state lives in an observable
//! model that background work updates from any thread.

pub mod album;
pub mod cli;
pub mod config;
pub mod controller;
pub mod cover;
pub mod error;
pub mod model;
pub mod state;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::from_default_env().add_directive("argos=info".parse()?))
        .init();

    cli::run_command(&args)
}
