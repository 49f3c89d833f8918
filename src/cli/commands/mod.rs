//! CLI command definitions and dispatch.
//!
//! Each group of subcommands lives in its own submodule:
//! - `library`: album browsing and album descriptions from a snapshot
//! - `images`: icon sizing and thumbnail generation
//! - `settings`: config file and image cache inspection

mod images;
mod library;
mod settings;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tokio::runtime::Runtime;

use crate::config::{self, Config};

pub use images::{cmd_fit, cmd_thumbnail};
pub use library::{cmd_albums, cmd_describe};
pub use settings::{cmd_cache, cmd_config};

/// Argos CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to the OS config directory)
    #[arg(long, global = true, env = "ARGOS_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for album descriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// List albums from a library snapshot
    Albums {
        /// Library snapshot (JSON)
        #[arg(short, long)]
        snapshot: PathBuf,
        /// Download album images into the cache
        #[arg(long)]
        fetch_images: bool,
    },
    /// Describe one album: metadata, ordered tracks and total length
    Describe {
        /// Album uri
        album_uri: String,
        /// Library snapshot (JSON)
        #[arg(short, long)]
        snapshot: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Compute the icon size for an image of the given dimensions
    Fit {
        width: u32,
        height: u32,
        /// Icon size (defaults to appearance.album_icon_size)
        #[arg(long)]
        size: Option<u32>,
    },
    /// Write album icons for image files
    Thumbnail {
        /// Image files
        #[arg(required = true)]
        images: Vec<PathBuf>,
        /// Directory for the generated PNG icons
        #[arg(short, long)]
        out_dir: PathBuf,
        /// Icon size (defaults to appearance.album_icon_size)
        #[arg(long)]
        size: Option<u32>,
    },
    /// Show the image cache size
    Cache {
        /// Delete every cached image
        #[arg(long)]
        clear: bool,
    },
    /// Show the config file location and effective settings
    Config {
        /// Write the effective settings back to the config file
        #[arg(long)]
        write: bool,
    },
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => config::load_from(path),
        None => config::load(),
    };

    match &cli.command {
        Commands::Albums {
            snapshot,
            fetch_images,
        } => {
            let rt = Runtime::new()?;
            cmd_albums(&rt, &config, snapshot, *fetch_images)
        }
        Commands::Describe {
            album_uri,
            snapshot,
            format,
        } => {
            let rt = Runtime::new()?;
            cmd_describe(&rt, &config, snapshot, album_uri, *format)
        }
        Commands::Fit {
            width,
            height,
            size,
        } => cmd_fit(*width, *height, icon_size(&config, *size)),
        Commands::Thumbnail {
            images,
            out_dir,
            size,
        } => cmd_thumbnail(images, out_dir, icon_size(&config, *size)),
        Commands::Cache { clear } => cmd_cache(&config, *clear),
        Commands::Config { write } => cmd_config(&config, cli.config.as_deref(), *write),
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Icon size from the command line, falling back to the config.
pub(crate) fn icon_size(config: &Config, size: Option<u32>) -> u32 {
    size.unwrap_or(config.appearance.album_icon_size)
}
