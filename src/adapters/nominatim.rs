use crate::adapters::{coordinate_value, RateLimiter};
use crate::domain::model::{Address, GeocodeResult, RawCoordinate};
use crate::domain::ports::Geocoder;
use crate::utils::error::{GeoError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://nominatim.openstreetmap.org";

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: Option<serde_json::Value>,
    lon: Option<serde_json::Value>,
    display_name: Option<String>,
}

/// OpenStreetMap Nominatim. Free, but strict about a real User-Agent and
/// one request per second.
pub struct NominatimGeocoder {
    client: Client,
    endpoint: String,
    user_agent: String,
    limiter: RateLimiter,
}

impl NominatimGeocoder {
    pub fn new(endpoint: &str, user_agent: &str, min_interval: Duration) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            user_agent: user_agent.to_string(),
            limiter: RateLimiter::new(min_interval),
        }
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &Address) -> Result<GeocodeResult> {
        let query = address.one_line();
        self.limiter.acquire().await;

        let url = format!("{}/search", self.endpoint);
        tracing::debug!("Making Nominatim request for '{}'", query);
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .query(&[("q", query.as_str()), ("format", "json"), ("limit", "1")])
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Nominatim response status: {}", status);
        if !status.is_success() {
            return Err(GeoError::from_provider_status("Nominatim", status));
        }

        let hits: Vec<SearchHit> = response.json().await?;
        let hit = hits.into_iter().next().ok_or_else(|| GeoError::GeocodingFailed {
            attempts: 1,
            message: format!("No results for '{}'", query),
        })?;

        Ok(GeocodeResult {
            coordinate: RawCoordinate::new(coordinate_value(hit.lat), coordinate_value(hit.lon)),
            formatted_address: hit.display_name,
        })
    }
}
