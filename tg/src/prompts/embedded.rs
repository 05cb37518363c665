//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Planner persona, sent as the first conversation message
pub const SYSTEM: &str = include_str!("../../prompts/system.pmt");

/// Natural-language planning request built from trip parameters
pub const TRIP_REQUEST: &str = include_str!("../../prompts/trip-request.pmt");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "system" => Some(SYSTEM),
        "trip-request" => Some(TRIP_REQUEST),
        _ => None,
    }
}
