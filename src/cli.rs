use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "reelhouse")]
#[command(author, version, about = "Personal media server for series and movies")]
pub struct Cli {
    /// Path to settings file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the media server
    Serve {
        /// Host to bind to (overrides settings)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides settings)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check a library file and report missing media
    Validate {
        /// Library file to validate (uses the configured one if not specified)
        library: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
