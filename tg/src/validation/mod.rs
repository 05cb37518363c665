//! Pre-flight checks on trip parameters
//!
//! Everything here is pure: no I/O, no logging side effects beyond tracing.
//! Messages are user-facing and shown verbatim.

mod input;

pub use input::{TripInput, validate_complete_trip_input};

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

pub const MIN_LOCATION_CHARS: usize = 2;
pub const MAX_LOCATION_CHARS: usize = 100;
pub const MAX_TRAVELERS: u32 = 50;
pub const MAX_TRIP_DAYS: u32 = 365;
pub const NOTES_MAX_CHARS: usize = 1000;

/// Characters never accepted in a place name
const FORBIDDEN_LOCATION_CHARS: &[char] = &['<', '>', '{', '}', '[', ']', '\\'];

static SCRIPT_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script.*?</script\s*>").expect("script block pattern is valid"));

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"));

/// A rejected trip parameter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} cannot be empty")]
    Empty { field: String },

    #[error("{field} must be at least 2 characters")]
    TooShort { field: String },

    #[error("{field} name is too long (max 100 characters)")]
    TooLong { field: String },

    #[error("{field} contains invalid characters")]
    InvalidCharacters { field: String },

    #[error("At least 1 traveler is required")]
    NoTravelers,

    #[error("Maximum 50 travelers allowed")]
    TooManyTravelers,

    #[error("Trip must be at least 1 day")]
    NoDays,

    #[error("Maximum trip duration is 365 days")]
    TooManyDays,

    #[error("Departure and destination cannot be the same")]
    SameLocation,

    /// Every failure of a whole-input check, one message per line
    #[error("{}", join_messages(.0))]
    Multiple(Vec<ValidationError>),
}

impl ValidationError {
    /// The individual failures (one for a single-check error)
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Multiple(errors) => errors.iter().map(ToString::to_string).collect(),
            other => vec![other.to_string()],
        }
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
}

/// Check a place name; `field` names it in the message
pub fn validate_location(value: &str, field: &str) -> Result<(), ValidationError> {
    debug!(%value, %field, "validate_location: called");
    let value = value.trim();
    let field = field.to_string();

    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }

    let chars = value.chars().count();
    if chars < MIN_LOCATION_CHARS {
        return Err(ValidationError::TooShort { field });
    }
    if chars > MAX_LOCATION_CHARS {
        return Err(ValidationError::TooLong { field });
    }
    if value.contains(FORBIDDEN_LOCATION_CHARS) {
        return Err(ValidationError::InvalidCharacters { field });
    }

    Ok(())
}

pub fn validate_people_count(people: u32) -> Result<(), ValidationError> {
    debug!(people, "validate_people_count: called");
    match people {
        0 => Err(ValidationError::NoTravelers),
        n if n > MAX_TRAVELERS => Err(ValidationError::TooManyTravelers),
        _ => Ok(()),
    }
}

pub fn validate_days(days: u32) -> Result<(), ValidationError> {
    debug!(days, "validate_days: called");
    match days {
        0 => Err(ValidationError::NoDays),
        n if n > MAX_TRIP_DAYS => Err(ValidationError::TooManyDays),
        _ => Ok(()),
    }
}

/// Departure and destination must differ, ignoring case and surrounding space
pub fn validate_same_location(from: &str, to: &str) -> Result<(), ValidationError> {
    debug!(%from, %to, "validate_same_location: called");
    if from.trim().to_lowercase() == to.trim().to_lowercase() {
        return Err(ValidationError::SameLocation);
    }
    Ok(())
}

/// Strip markup from free text and bound its length
///
/// Script blocks go first, content included, then any remaining tags. The
/// result is trimmed and cut to `max_chars` characters with "..." appended
/// when anything was cut.
pub fn sanitize_text_input(text: &str, max_chars: usize) -> String {
    debug!(len = text.len(), max_chars, "sanitize_text_input: called");
    let without_scripts = SCRIPT_BLOCK_RE.replace_all(text, "");
    let without_tags = TAG_RE.replace_all(&without_scripts, "");
    let trimmed = without_tags.trim();

    match trimmed.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
