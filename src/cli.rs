use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "movietag")]
#[command(author, version, about = "Identify movie files on TMDB and tag them without re-encoding")]
pub struct Cli {
    /// Path to config file
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
    /// Show the title and year parsed from a file name
    Parse {
        /// File name or path to parse
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search TMDB for a movie title
    Search {
        /// Title to search for
        #[arg(required = true)]
        query: String,

        /// Restrict results to a release year
        #[arg(short, long)]
        year: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List TMDB candidates for a movie file
    Identify {
        /// Movie file to identify
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Tag a movie file with TMDB metadata and rename it
    Tag {
        /// Movie file to tag
        #[arg(required = true)]
        file: PathBuf,

        /// Search for this title instead of the one parsed from the file name
        #[arg(short, long)]
        query: Option<String>,

        /// Pick candidate N (1-based) instead of asking
        #[arg(short, long)]
        pick: Option<usize>,

        /// Do not embed the poster as cover art
        #[arg(long)]
        no_poster: bool,

        /// Show what would be done without executing
        #[arg(long)]
        dry_run: bool,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Store the TMDB API key in the config file
    SetApiKey {
        /// TMDB API key (v3)
        key: String,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
