//! Trip request composition
//!
//! Turns validated trip parameters and traveler preferences into the
//! natural-language request the planner sends as the user message.

use eyre::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::prompts::PromptLoader;
use crate::validation::TripInput;

/// Group types offered by the CLI
pub const GROUP_TYPES: &[&str] = &["Solo", "Couple", "Friends", "Family", "Business"];

/// Everything the traveler told us about the trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRequest {
    pub from_city: String,
    pub to_city: String,
    pub days: u32,
    pub people: u32,
    pub group_type: String,
    pub transport: String,
    pub hotel_budget: String,
    pub accommodation: Vec<String>,
    pub food: Vec<String>,
    pub style: Vec<String>,
    pub pace: String,
    pub notes: Option<String>,
}

impl Default for TripRequest {
    fn default() -> Self {
        Self {
            from_city: String::new(),
            to_city: String::new(),
            days: 3,
            people: 2,
            group_type: "Solo".to_string(),
            transport: "Any".to_string(),
            hotel_budget: "Economy (₹1000-3000)".to_string(),
            accommodation: vec!["Hotel".to_string()],
            food: vec!["Local Cuisine".to_string()],
            style: vec!["Budget Friendly".to_string()],
            pace: "Balanced (3-5 activities/day)".to_string(),
            notes: None,
        }
    }
}

/// Flattened view handed to the `trip-request` template
#[derive(Serialize)]
struct RequestContext<'a> {
    days: u32,
    people: u32,
    group: String,
    from: &'a str,
    to: &'a str,
    transport: &'a str,
    hotel_budget: &'a str,
    accommodation: String,
    food: String,
    style: String,
    pace: &'a str,
    notes: &'a str,
}

fn join_or(items: &[String], fallback: &str) -> String {
    if items.is_empty() {
        fallback.to_string()
    } else {
        items.join(", ")
    }
}

impl TripRequest {
    /// The subset the validation layer checks
    pub fn trip_input(&self) -> TripInput {
        TripInput {
            from_city: self.from_city.clone(),
            to_city: self.to_city.clone(),
            people: self.people,
            days: self.days,
            notes: self.notes.clone(),
        }
    }

    /// Take back the validated places and sanitized notes
    pub fn with_validated(mut self, input: TripInput) -> Self {
        self.from_city = input.from_city;
        self.to_city = input.to_city;
        self.people = input.people;
        self.days = input.days;
        self.notes = input.notes;
        self
    }

    /// Render the planning request
    pub fn to_prompt(&self, loader: &PromptLoader) -> Result<String> {
        debug!(from = %self.from_city, to = %self.to_city, days = self.days, "TripRequest::to_prompt: called");
        let context = RequestContext {
            days: self.days,
            people: self.people,
            group: self.group_type.to_lowercase(),
            from: self.from_city.trim(),
            to: self.to_city.trim(),
            transport: &self.transport,
            hotel_budget: &self.hotel_budget,
            accommodation: join_or(&self.accommodation, "Any"),
            food: join_or(&self.food, "Any"),
            style: join_or(&self.style, "Balanced"),
            pace: &self.pace,
            notes: self.notes.as_deref().filter(|n| !n.trim().is_empty()).unwrap_or("None"),
        };
        loader.render("trip-request", &context)
    }
}
