//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Skyfolio: media gallery for a Bluesky profile
#[derive(Parser, Debug)]
#[command(name = "skyfolio")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subject handle, overrides the configuration file
    #[arg(long, global = true)]
    pub handle: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the profile summary as JSON
    Profile,

    /// Print accepted media posts as JSON lines
    Feed {
        /// Additional pages to fetch after the initial set
        #[arg(long, default_value = "0")]
        pages: usize,

        /// Minimum items in the initial set (defaults to `initial_count`)
        #[arg(long)]
        min_count: Option<usize>,
    },

    /// Write a static HTML gallery of the initial set
    Render {
        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Start the gallery web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Start the standalone RSS edge proxy
    Proxy {
        /// Port to listen on
        #[arg(short, long, default_value = "8787")]
        port: u16,
    },
}
