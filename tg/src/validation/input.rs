//! Whole-trip validation

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    NOTES_MAX_CHARS, ValidationError, sanitize_text_input, validate_days, validate_location, validate_people_count,
    validate_same_location,
};

pub const DEPARTURE_FIELD: &str = "Departure location";
pub const DESTINATION_FIELD: &str = "Destination";

/// Raw trip parameters as the caller collected them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripInput {
    pub from_city: String,
    pub to_city: String,
    pub people: u32,
    pub days: u32,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Run every check and collect all failures
///
/// The same-location check only runs when both places are non-empty. On
/// success the input comes back with `notes` sanitized; nothing else changes.
pub fn validate_complete_trip_input(mut input: TripInput) -> Result<TripInput, ValidationError> {
    debug!(from = %input.from_city, to = %input.to_city, "validate_complete_trip_input: called");
    let mut errors = Vec::new();

    errors.extend(validate_location(&input.from_city, DEPARTURE_FIELD).err());
    errors.extend(validate_location(&input.to_city, DESTINATION_FIELD).err());

    if !input.from_city.is_empty() && !input.to_city.is_empty() {
        errors.extend(validate_same_location(&input.from_city, &input.to_city).err());
    }

    errors.extend(validate_people_count(input.people).err());
    errors.extend(validate_days(input.days).err());

    if let Some(notes) = input.notes.as_deref() {
        input.notes = Some(sanitize_text_input(notes, NOTES_MAX_CHARS));
    }

    match errors.len() {
        0 => Ok(input),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(from: &str, to: &str, people: u32, days: u32) -> TripInput {
        TripInput {
            from_city: from.to_string(),
            to_city: to.to_string(),
            people,
            days,
            notes: None,
        }
    }

    #[test]
    fn test_valid_input_passes_through() {
        let trip = input("Bengaluru", "Goa", 4, 3);
        assert_eq!(validate_complete_trip_input(trip.clone()).unwrap(), trip);
    }

    #[test]
    fn test_notes_are_sanitized() {
        let mut trip = input("Bengaluru", "Goa", 4, 3);
        trip.notes = Some("  <i>beach</i> shacks ".to_string());

        let validated = validate_complete_trip_input(trip).unwrap();
        assert_eq!(validated.notes.as_deref(), Some("beach shacks"));
    }

    #[test]
    fn test_collects_every_failure_in_order() {
        let err = validate_complete_trip_input(input("", "G", 0, 400)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Departure location cannot be empty\n\
             Destination must be at least 2 characters\n\
             At least 1 traveler is required\n\
             Maximum trip duration is 365 days"
        );
    }

    #[test]
    fn test_same_location_reported() {
        let err = validate_complete_trip_input(input("Delhi", "DELHI", 2, 2)).unwrap_err();
        assert_eq!(err, ValidationError::SameLocation);
    }

    #[test]
    fn test_same_location_skipped_when_one_side_empty() {
        let err = validate_complete_trip_input(input("", "", 2, 2)).unwrap_err();
        assert!(!err.to_string().contains("cannot be the same"));
        assert_eq!(err.messages().len(), 2);
    }

    #[test]
    fn test_whitespace_only_places_compare_equal() {
        // both non-empty strings, so the same-location rule applies too
        let err = validate_complete_trip_input(input(" ", "  ", 2, 2)).unwrap_err();
        assert_eq!(err.messages().len(), 3);
    }
}
