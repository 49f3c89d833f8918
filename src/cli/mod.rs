//! Command-line interface for argos.
//!
//! Browses and describes albums from a library snapshot and produces album
//! icons without a running player UI.

mod commands;

pub use commands::{Cli, Commands, OutputFormat, run_command};
