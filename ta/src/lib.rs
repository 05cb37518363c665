//! TripArchive - JSON-file trip history for TripGenie
//!
//! Stores previously generated itineraries in a single pretty-printed JSON
//! array. Reads degrade to an empty history on malformed content; writes
//! replace the whole file atomically.
//!
//! # Layout
//!
//! ```text
//! ~/.local/share/tripgenie/
//! └── trip_history.json   # [ {id, created_at, from_city, ...}, ... ]
//! ```
//!
//! # Example
//!
//! ```ignore
//! use triparchive::TripArchive;
//!
//! let archive = TripArchive::open("data/trip_history.json")?;
//! let id = archive.save("Mumbai", "Paris", 4, 2, "Couple", &plan).unwrap();
//! let newest = archive.list(Some(10));
//! ```

pub mod cli;
pub mod config;
mod error;
mod export;
mod store;

use std::path::PathBuf;

pub use error::ArchiveError;
pub use export::render_text;
pub use store::{NewTrip, TripArchive, TripId, TripRecord};

/// File name of the trip history inside the data directory
pub const HISTORY_FILE: &str = "trip_history.json";

/// Default archive location (`<data dir>/tripgenie/trip_history.json`)
pub fn default_archive_path() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("tripgenie"))
        .unwrap_or_else(|| PathBuf::from("data"))
        .join(HISTORY_FILE)
}
