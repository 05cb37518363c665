//! Plain-text export of archived trips

use std::fs;
use std::path::Path;
use tracing::{debug, error, info, warn};

use crate::store::{TripArchive, TripRecord};

const RULE_WIDTH: usize = 80;

/// Render a record as a plain-text document with a fixed header block
pub fn render_text(trip: &TripRecord) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    format!(
        "TripGenie Trip Plan\n{rule}\n\n\
         From: {}\n\
         To: {}\n\
         Duration: {} days\n\
         Travelers: {} ({})\n\
         Generated: {}\n\n\
         {rule}\n\n\
         {}",
        trip.from_city, trip.to_city, trip.days, trip.people, trip.group_type, trip.created_at, trip.plan_text,
    )
}

impl TripArchive {
    /// Write one trip to `output_path`; false if the id is unknown or the write fails
    pub fn export_to_text(&self, id: &str, output_path: impl AsRef<Path>) -> bool {
        let output_path = output_path.as_ref();
        debug!(%id, output = %output_path.display(), "TripArchive::export_to_text: called");

        let Some(trip) = self.get(id) else {
            warn!(%id, "Cannot export unknown trip");
            return false;
        };

        match fs::write(output_path, render_text(&trip)) {
            Ok(()) => {
                info!(%id, output = %output_path.display(), "Trip exported");
                true
            }
            Err(e) => {
                error!(%id, error = %e, "Failed to export trip");
                false
            }
        }
    }
}
