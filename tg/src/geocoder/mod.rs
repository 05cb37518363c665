//! Geocoder - free-text place names to confirmed locations
//!
//! Calls go through a [`GeocodeTransport`]; [`NominatimTransport`] is the
//! production one. Each [`Geocoder`] keeps a minimum delay between the end of
//! one transport call and the start of the next, as Nominatim's usage policy
//! asks. The last-call instant sits behind an async mutex that is held across
//! the wait and the request, so concurrent searches queue up behind it.

mod location;
mod nominatim;

pub use location::{Address, Location, Place};
pub use nominatim::NominatimTransport;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::LocationConfig;

/// Geocoding failures; they stop at the [`Geocoder`] boundary
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("Geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Geocoding provider returned status {0}")]
    Status(u16),

    #[error("Malformed geocoding response: {0}")]
    Malformed(String),

    #[error("Failed to decode geocoding JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// One raw search against a geocoding provider
#[async_trait]
pub trait GeocodeTransport: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Place>, GeoError>;
}

/// Rate-limited location search
pub struct Geocoder {
    transport: Arc<dyn GeocodeTransport>,
    max_results: usize,
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl Geocoder {
    pub fn new(transport: Arc<dyn GeocodeTransport>, config: &LocationConfig) -> Self {
        debug!(
            max_results = config.max_results,
            delay_ms = config.rate_limit_delay_ms,
            "Geocoder::new: called"
        );
        Self {
            transport,
            max_results: config.max_results,
            min_interval: Duration::from_millis(config.rate_limit_delay_ms),
            last_call: Mutex::new(None),
        }
    }

    /// Geocoder backed by Nominatim
    pub fn from_config(config: &LocationConfig) -> Result<Self, GeoError> {
        let transport = NominatimTransport::new(config)?;
        info!(url = %config.nominatim_url, "Geocoder initialized");
        Ok(Self::new(Arc::new(transport), config))
    }

    /// Search for locations matching `query`
    ///
    /// Blank queries return nothing without touching the transport. Any
    /// transport or decoding failure is logged and yields an empty list.
    pub async fn search(&self, query: &str) -> Vec<Location> {
        debug!(%query, "Geocoder::search: called");
        let query = query.trim();
        if query.is_empty() {
            warn!("Geocoder::search: empty search query");
            return vec![];
        }

        let mut last_call = self.last_call.lock().await;
        if let Some(prev) = *last_call {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                debug!(wait_ms = wait.as_millis() as u64, "Geocoder::search: respecting rate limit");
                tokio::time::sleep(wait).await;
            }
        }

        let started = Instant::now();
        let outcome = self.transport.search(query, self.max_results).await;
        *last_call = Some(Instant::now());
        drop(last_call);

        let places = match outcome {
            Ok(places) => places,
            Err(e) => {
                error!(%query, error = %e, "Location search failed");
                return vec![];
            }
        };

        let locations: Result<Vec<_>, _> = places.into_iter().map(Location::from_place).collect();
        match locations {
            Ok(locations) => {
                info!(
                    %query,
                    results = locations.len(),
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Location search completed"
                );
                locations
            }
            Err(e) => {
                error!(%query, error = %e, "Location search returned malformed data");
                vec![]
            }
        }
    }

    /// Latitude and longitude of the best match
    pub async fn get_coordinates(&self, query: &str) -> Option<(f64, f64)> {
        debug!(%query, "Geocoder::get_coordinates: called");
        self.get_location_details(query).await.map(|loc| loc.coordinates())
    }

    /// The best match, if any
    pub async fn get_location_details(&self, query: &str) -> Option<Location> {
        debug!(%query, "Geocoder::get_location_details: called");
        self.search(query).await.into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    /// Records when each call starts and ends and replays a fixed outcome
    struct FakeTransport {
        calls: StdMutex<Vec<(Instant, Instant, String, usize)>>,
        reply: fn() -> Result<Vec<Place>, GeoError>,
        latency: Duration,
    }

    impl FakeTransport {
        fn new(reply: fn() -> Result<Vec<Place>, GeoError>) -> Arc<Self> {
            Arc::new(Self {
                calls: StdMutex::new(Vec::new()),
                reply,
                latency: Duration::from_millis(5),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl GeocodeTransport for FakeTransport {
        async fn search(&self, query: &str, limit: usize) -> Result<Vec<Place>, GeoError> {
            let start = Instant::now();
            tokio::time::sleep(self.latency).await;
            self.calls
                .lock()
                .unwrap()
                .push((start, Instant::now(), query.to_string(), limit));
            (self.reply)()
        }
    }

    fn two_places() -> Result<Vec<Place>, GeoError> {
        Ok(vec![
            Place {
                display_name: "Kyoto, Kyoto Prefecture, Japan".to_string(),
                lat: "35.0116".to_string(),
                lon: "135.7681".to_string(),
                address: Some(Address {
                    city: Some("Kyoto".to_string()),
                    country: Some("Japan".to_string()),
                    ..Address::default()
                }),
            },
            Place {
                display_name: "Kyoto, Kansas".to_string(),
                lat: "37.0".to_string(),
                lon: "-97.0".to_string(),
                address: None,
            },
        ])
    }

    fn config(delay_ms: u64) -> LocationConfig {
        LocationConfig {
            rate_limit_delay_ms: delay_ms,
            ..LocationConfig::default()
        }
    }

    #[tokio::test]
    async fn test_blank_query_skips_transport() {
        let transport = FakeTransport::new(two_places);
        let geocoder = Geocoder::new(transport.clone(), &config(0));

        assert!(geocoder.search("").await.is_empty());
        assert!(geocoder.search("   ").await.is_empty());
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_search_trims_and_maps() {
        let transport = FakeTransport::new(two_places);
        let geocoder = Geocoder::new(transport.clone(), &config(0));

        let results = geocoder.search("  Kyoto ").await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].to_string(), "Kyoto, Japan");
        assert_eq!(results[1].city, None);
        let calls = transport.calls.lock().unwrap();
        assert_eq!(calls[0].2, "Kyoto");
        assert_eq!(calls[0].3, 5);
    }

    #[tokio::test]
    async fn test_failure_yields_empty() {
        let transport = FakeTransport::new(|| Err(GeoError::Status(503)));
        let geocoder = Geocoder::new(transport.clone(), &config(0));

        assert!(geocoder.search("Paris").await.is_empty());
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_malformed_place_yields_empty() {
        let transport = FakeTransport::new(|| {
            Ok(vec![Place {
                display_name: "Broken".to_string(),
                lat: "?".to_string(),
                lon: "1".to_string(),
                address: None,
            }])
        });
        let geocoder = Geocoder::new(transport, &config(0));

        assert!(geocoder.search("Broken").await.is_empty());
    }

    #[tokio::test]
    async fn test_first_result_projections() {
        let transport = FakeTransport::new(two_places);
        let geocoder = Geocoder::new(transport, &config(0));

        assert_eq!(geocoder.get_coordinates("Kyoto").await, Some((35.0116, 135.7681)));
        let details = geocoder.get_location_details("Kyoto").await.unwrap();
        assert_eq!(details.city.as_deref(), Some("Kyoto"));

        let empty = Geocoder::new(FakeTransport::new(|| Ok(vec![])), &config(0));
        assert_eq!(empty.get_coordinates("Atlantis").await, None);
        assert!(empty.get_location_details("Atlantis").await.is_none());
    }

    #[tokio::test]
    async fn test_calls_are_spaced_by_delay() {
        let delay = Duration::from_millis(60);
        let transport = FakeTransport::new(two_places);
        let geocoder = Geocoder::new(transport.clone(), &config(delay.as_millis() as u64));

        geocoder.search("Kyoto").await;
        geocoder.search("Osaka").await;
        geocoder.search("Nara").await;

        let calls = transport.calls.lock().unwrap();
        assert_eq!(calls.len(), 3);
        for pair in calls.windows(2) {
            let (_, prev_end, _, _) = pair[0];
            let (next_start, _, _, _) = pair[1];
            assert!(next_start.duration_since(prev_end) >= delay);
        }
    }

    #[tokio::test]
    async fn test_concurrent_searches_serialize() {
        let delay = Duration::from_millis(40);
        let transport = FakeTransport::new(two_places);
        let geocoder = Arc::new(Geocoder::new(transport.clone(), &config(delay.as_millis() as u64)));

        let a = tokio::spawn({
            let geocoder = geocoder.clone();
            async move { geocoder.search("Lisbon").await }
        });
        let b = tokio::spawn({
            let geocoder = geocoder.clone();
            async move { geocoder.search("Porto").await }
        });
        a.await.unwrap();
        b.await.unwrap();

        let mut calls = transport.calls.lock().unwrap().clone();
        calls.sort_by_key(|c| c.0);
        assert_eq!(calls.len(), 2);
        assert!(calls[1].0.duration_since(calls[0].1) >= delay);
    }

    #[test]
    fn test_decode_and_malformed_errors_read_differently() {
        let decode = GeoError::from(serde_json::from_str::<Vec<Place>>("not json").unwrap_err());
        let malformed = GeoError::Malformed("lat is not a number".to_string());

        assert!(decode.to_string().starts_with("Failed to decode geocoding JSON: "));
        assert_eq!(malformed.to_string(), "Malformed geocoding response: lat is not a number");
    }
}
