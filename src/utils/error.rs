use crate::domain::model::{CoordinateStatus, GeoPoint};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeoError {
    #[error("Address is missing or empty")]
    InvalidAddress,

    #[error("Geocoding failed after {attempts} attempt(s): {message}")]
    GeocodingFailed { attempts: u32, message: String },

    #[error("Geocoding resolved into water after {attempts} attempt(s), last point {point}")]
    GeocodingInWater { attempts: u32, point: GeoPoint },

    #[error("Geocoding provider rejected the request: {message}")]
    ProviderRejected { message: String },

    #[error("Geocoded coordinate rejected: {status}")]
    InvalidCoordinate { status: CoordinateStatus },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

impl GeoError {
    /// Provider-side failures worth another request; everything else is final.
    /// A body that does not decode will not decode on the next call either.
    pub fn is_retryable(&self) -> bool {
        match self {
            GeoError::GeocodingFailed { .. } => true,
            GeoError::ApiError(e) => !e.is_decode() && !e.is_builder(),
            _ => false,
        }
    }

    /// Maps a non-success HTTP status from a provider. Client errors other than
    /// 429 mean the request itself is wrong (bad key, bad query) and are final.
    pub fn from_provider_status(provider: &str, status: reqwest::StatusCode) -> Self {
        let message = format!("{} returned HTTP {}", provider, status);
        if status.is_client_error() && status != reqwest::StatusCode::TOO_MANY_REQUESTS {
            GeoError::ProviderRejected { message }
        } else {
            GeoError::GeocodingFailed {
                attempts: 1,
                message,
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, GeoError>;
