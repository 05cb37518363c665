//! CLI command definitions and subcommands

use clap::builder::PossibleValuesParser;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::request::{GROUP_TYPES, TripRequest};

/// Transport modes offered for the trip
pub const TRANSPORT_MODES: &[&str] = &["Flight", "Train", "Bus/Road Trip", "Any"];

/// TripGenie - tool-calling travel planning assistant
#[derive(Parser)]
#[command(
    name = "tg",
    about = "Plan trips with a search-augmented chat model",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check trip parameters without calling any service
    Validate {
        #[command(flatten)]
        trip: TripArgs,
    },

    /// Look up a place by name
    Locate {
        /// Place to search for
        query: String,

        /// Show only the best match with its coordinates
        #[arg(long)]
        best: bool,
    },

    /// Generate a trip plan
    Plan {
        #[command(flatten)]
        trip: TripArgs,

        #[command(flatten)]
        preferences: PreferenceArgs,

        /// Print each model and tool message as it is produced
        #[arg(long)]
        stream: bool,

        /// Save the finished plan to the trip archive
        #[arg(long)]
        save: bool,
    },
}

/// Core trip parameters
#[derive(Debug, Clone, Args)]
pub struct TripArgs {
    /// Departure location
    #[arg(short, long)]
    pub from: String,

    /// Destination
    #[arg(short, long)]
    pub to: String,

    /// Trip length in days
    #[arg(short, long, default_value = "3")]
    pub days: u32,

    /// Number of travelers
    #[arg(short, long, default_value = "2")]
    pub people: u32,

    /// Special requirements
    #[arg(short, long)]
    pub notes: Option<String>,
}

/// Traveler preferences folded into the planning request
#[derive(Debug, Clone, Args)]
pub struct PreferenceArgs {
    /// Group type
    #[arg(short, long, default_value = "Solo", value_parser = PossibleValuesParser::new(GROUP_TYPES.iter().copied()))]
    pub group: String,

    /// Primary transport
    #[arg(long, default_value = "Any", value_parser = PossibleValuesParser::new(TRANSPORT_MODES.iter().copied()))]
    pub transport: String,

    /// Hotel budget per night
    #[arg(long)]
    pub budget: Option<String>,

    /// Accommodation types (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub stay: Vec<String>,

    /// Food preferences (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub food: Vec<String>,

    /// Trip styles (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub style: Vec<String>,

    /// Activity pace
    #[arg(long)]
    pub pace: Option<String>,
}

impl TripArgs {
    /// A request with these parameters and default preferences
    pub fn to_request(&self) -> TripRequest {
        TripRequest {
            from_city: self.from.clone(),
            to_city: self.to.clone(),
            days: self.days,
            people: self.people,
            notes: self.notes.clone(),
            ..TripRequest::default()
        }
    }
}

impl PreferenceArgs {
    /// Overlay the given preferences; omitted lists keep the defaults
    pub fn apply(&self, mut request: TripRequest) -> TripRequest {
        debug!(group = %self.group, transport = %self.transport, "PreferenceArgs::apply: called");
        request.group_type = self.group.clone();
        request.transport = self.transport.clone();
        if let Some(budget) = &self.budget {
            request.hotel_budget = budget.clone();
        }
        if let Some(pace) = &self.pace {
            request.pace = pace.clone();
        }
        if !self.stay.is_empty() {
            request.accommodation = self.stay.clone();
        }
        if !self.food.is_empty() {
            request.food = self.food.clone();
        }
        if !self.style.is_empty() {
            request.style = self.style.clone();
        }
        request
    }
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tripgenie")
        .join("logs")
        .join("tripgenie.log");
    debug!(?path, "get_log_path: returning path");
    path
}
