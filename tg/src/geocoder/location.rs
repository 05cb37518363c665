//! Location records produced by the geocoder

use serde::{Deserialize, Serialize};
use std::fmt;

use super::GeoError;

/// A confirmed place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

impl Location {
    /// Build from one Nominatim place
    ///
    /// `city` takes the first of city, town, village present in the address.
    pub fn from_place(place: Place) -> Result<Self, GeoError> {
        let latitude = parse_coordinate("lat", &place.lat)?;
        let longitude = parse_coordinate("lon", &place.lon)?;
        let address = place.address.unwrap_or_default();

        Ok(Self {
            name: place.display_name.clone(),
            label: place.display_name,
            latitude,
            longitude,
            city: address.city.or(address.town).or(address.village),
            state: address.state,
            country: address.country,
        })
    }

    pub fn coordinates(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

fn parse_coordinate(field: &str, raw: &str) -> Result<f64, GeoError> {
    raw.trim()
        .parse()
        .map_err(|_| GeoError::Malformed(format!("{} is not a number: {:?}", field, raw)))
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = [&self.city, &self.state, &self.country]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .collect();
        if parts.is_empty() {
            f.write_str(&self.label)
        } else {
            f.write_str(&parts.join(", "))
        }
    }
}

/// One entry of a Nominatim `format=json` search response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Place {
    #[serde(default)]
    pub display_name: String,
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub address: Option<Address>,
}

/// The `addressdetails=1` block of a place
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Address {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(json: serde_json::Value) -> Place {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_from_place_maps_fields() {
        let loc = Location::from_place(place(serde_json::json!({
            "display_name": "Paris, Île-de-France, France métropolitaine, France",
            "lat": "48.8588897",
            "lon": "2.3200410",
            "address": { "city": "Paris", "state": "Île-de-France", "country": "France" }
        })))
        .unwrap();

        assert_eq!(loc.name, loc.label);
        assert!((loc.latitude - 48.8588897).abs() < 1e-9);
        assert_eq!(loc.city.as_deref(), Some("Paris"));
        assert_eq!(loc.to_string(), "Paris, Île-de-France, France");
    }

    #[test]
    fn test_city_prefers_city_then_town_then_village() {
        let loc = Location::from_place(place(serde_json::json!({
            "display_name": "Manali", "lat": "32.24", "lon": "77.18",
            "address": { "town": "Manali", "village": "Old Manali", "country": "India" }
        })))
        .unwrap();
        assert_eq!(loc.city.as_deref(), Some("Manali"));

        let loc = Location::from_place(place(serde_json::json!({
            "display_name": "Hampi", "lat": "15.33", "lon": "76.46",
            "address": { "village": "Hampi" }
        })))
        .unwrap();
        assert_eq!(loc.city.as_deref(), Some("Hampi"));
    }

    #[test]
    fn test_display_falls_back_to_label() {
        let loc = Location::from_place(place(serde_json::json!({
            "display_name": "Atlantic Ocean", "lat": "0", "lon": "-30"
        })))
        .unwrap();
        assert_eq!(loc.to_string(), "Atlantic Ocean");
        assert_eq!(loc.coordinates(), (0.0, -30.0));
    }

    #[test]
    fn test_bad_coordinate_is_malformed() {
        let result = Location::from_place(place(serde_json::json!({
            "display_name": "Nowhere", "lat": "north", "lon": "1"
        })));
        assert!(matches!(result, Err(GeoError::Malformed(_))));
    }
}
