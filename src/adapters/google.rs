use crate::adapters::{coordinate_value, RateLimiter};
use crate::domain::model::{Address, GeocodeResult, RawCoordinate};
use crate::domain::ports::Geocoder;
use crate::utils::error::{GeoError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeHit>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeHit {
    formatted_address: Option<String>,
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Option<Location>,
}

#[derive(Debug, Deserialize)]
struct Location {
    lat: Option<serde_json::Value>,
    lng: Option<serde_json::Value>,
}

/// Google Geocoding API (paid, keyed).
pub struct GoogleGeocoder {
    client: Client,
    endpoint: String,
    api_key: String,
    limiter: RateLimiter,
}

impl GoogleGeocoder {
    pub fn new(endpoint: &str, api_key: &str, min_interval: Duration) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            limiter: RateLimiter::new(min_interval),
        }
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, address: &Address) -> Result<GeocodeResult> {
        let query = address.one_line();
        self.limiter.acquire().await;

        tracing::debug!("Making Google geocode request for '{}'", query);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("address", query.as_str()), ("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeoError::from_provider_status("Google geocoder", status));
        }

        let body: GeocodeResponse = response.json().await?;
        if body.status != "OK" {
            let message = match body.error_message {
                Some(detail) => format!("{}: {}", body.status, detail),
                None => body.status.clone(),
            };
            // a denied key or a malformed request fails the same way every time
            return Err(match body.status.as_str() {
                "REQUEST_DENIED" | "INVALID_REQUEST" => GeoError::ProviderRejected { message },
                _ => GeoError::GeocodingFailed {
                    attempts: 1,
                    message,
                },
            });
        }

        let hit = body
            .results
            .into_iter()
            .next()
            .ok_or_else(|| GeoError::GeocodingFailed {
                attempts: 1,
                message: format!("No results for '{}'", query),
            })?;

        let (lat, lng) = match hit.geometry.and_then(|g| g.location) {
            Some(location) => (location.lat, location.lng),
            None => (None, None),
        };

        Ok(GeocodeResult {
            coordinate: RawCoordinate::new(coordinate_value(lat), coordinate_value(lng)),
            formatted_address: hit.formatted_address,
        })
    }
}
