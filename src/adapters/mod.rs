// Adapters layer: concrete geocoding providers behind the `Geocoder` port.

pub mod google;
pub mod nominatim;
pub mod rate_limiter;

pub use google::GoogleGeocoder;
pub use nominatim::NominatimGeocoder;
pub use rate_limiter::RateLimiter;

use crate::config::region_config::GeocodingConfig;
use crate::domain::ports::Geocoder;
use crate::utils::error::{GeoError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Nominatim,
    Google,
}

impl Provider {
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Provider::Nominatim => nominatim::DEFAULT_ENDPOINT,
            Provider::Google => google::DEFAULT_ENDPOINT,
        }
    }

    pub fn default_min_interval(&self) -> Duration {
        match self {
            Provider::Nominatim => Duration::from_secs(1),
            Provider::Google => Duration::from_millis(100),
        }
    }
}

pub fn build_geocoder(config: &GeocodingConfig) -> Result<Arc<dyn Geocoder>> {
    let geocoder: Arc<dyn Geocoder> = match config.provider() {
        Provider::Nominatim => Arc::new(NominatimGeocoder::new(
            config.endpoint(),
            config.user_agent(),
            config.min_interval(),
        )),
        Provider::Google => {
            let api_key = config
                .api_key
                .as_deref()
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| GeoError::ConfigError {
                    message: "Google geocoding requires an API key".to_string(),
                })?;
            Arc::new(GoogleGeocoder::new(
                config.endpoint(),
                api_key,
                config.min_interval(),
            ))
        }
    };
    Ok(geocoder)
}

/// Providers disagree on whether coordinates are numbers or numeric strings.
/// Numeric strings become numbers; anything else is passed through untouched
/// so classification can report it.
pub(crate) fn coordinate_value(value: Option<serde_json::Value>) -> Option<serde_json::Value> {
    match value {
        Some(serde_json::Value::String(text)) => match text.trim().parse::<f64>() {
            Ok(parsed) => serde_json::Number::from_f64(parsed)
                .map(serde_json::Value::Number)
                .or(Some(serde_json::Value::String(text))),
            Err(_) => Some(serde_json::Value::String(text)),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coordinate_value_normalizes_numeric_strings() {
        assert_eq!(coordinate_value(Some(json!("29.95"))), Some(json!(29.95)));
        assert_eq!(coordinate_value(Some(json!(29.95))), Some(json!(29.95)));
        assert_eq!(coordinate_value(Some(json!("north"))), Some(json!("north")));
        assert_eq!(coordinate_value(Some(json!("NaN"))), Some(json!("NaN")));
        assert_eq!(coordinate_value(None), None);
    }

    #[test]
    fn test_google_requires_api_key() {
        let config = GeocodingConfig {
            provider: Some(Provider::Google),
            ..Default::default()
        };
        assert!(build_geocoder(&config).is_err());
        assert!(build_geocoder(&GeocodingConfig::default()).is_ok());
    }
}
