//! Nominatim HTTP transport

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::{GeoError, GeocodeTransport, Place};
use crate::config::LocationConfig;

/// OpenStreetMap Nominatim search over HTTP
pub struct NominatimTransport {
    http: Client,
    url: String,
    user_agent: String,
}

impl NominatimTransport {
    pub fn new(config: &LocationConfig) -> Result<Self, GeoError> {
        debug!(url = %config.nominatim_url, "NominatimTransport::new: called");
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            http,
            url: config.nominatim_url.clone(),
            user_agent: config.user_agent.clone(),
        })
    }
}

#[async_trait]
impl GeocodeTransport for NominatimTransport {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Place>, GeoError> {
        debug!(%query, limit, "NominatimTransport::search: called");
        let limit = limit.to_string();
        let response = self
            .http
            .get(&self.url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("addressdetails", "1"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeoError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
