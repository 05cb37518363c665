//! CLI argument parsing for triparchive

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ta")]
#[command(author, version, about = "Browse and manage archived TripGenie plans", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Path to the trip history file (overrides config)
    #[arg(short, long)]
    pub archive: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List archived trips, newest first
    List {
        /// Maximum number of trips to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Print one archived plan
    Show {
        /// Trip ID
        #[arg(required = true)]
        id: String,
    },

    /// Delete one archived trip
    Delete {
        /// Trip ID
        #[arg(required = true)]
        id: String,
    },

    /// Delete every archived trip
    Clear {
        /// Confirm deletion of the whole history
        #[arg(long)]
        yes: bool,
    },

    /// Export a trip to a plain-text file
    Export {
        /// Trip ID
        #[arg(required = true)]
        id: String,

        /// Output file path
        #[arg(required = true)]
        output: PathBuf,
    },
}
