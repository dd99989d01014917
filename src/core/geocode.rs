use crate::core::validator::CoordinateValidator;
use crate::domain::model::{Address, CoordinateStatus, GeoPoint};
use crate::domain::ports::Geocoder;
use crate::utils::error::{GeoError, Result};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total provider calls, the first one included.
    pub max_attempts: u32,
    /// Fixed wait between two consecutive attempts.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(1),
        }
    }
}

/// Geocodes `address` and insists on a dry, in-bounds result.
///
/// A point in water gets the fixed nudge once; if that is not enough the
/// provider is asked again after `policy.backoff`, since an ambiguous address
/// can resolve differently on another call. Out-of-bounds, missing or
/// malformed coordinates are returned as [`GeoError::InvalidCoordinate`]
/// without retrying.
pub async fn geocode_and_validate(
    validator: &CoordinateValidator,
    geocoder: &dyn Geocoder,
    address: &Address,
    policy: &RetryPolicy,
) -> Result<GeoPoint> {
    if address.is_empty() {
        return Err(GeoError::InvalidAddress);
    }

    let max_attempts = policy.max_attempts.max(1);
    let query = address.one_line();
    let mut last_water_point = None;
    let mut last_failure = String::new();

    for attempt in 1..=max_attempts {
        if attempt > 1 {
            tokio::time::sleep(policy.backoff).await;
        }

        tracing::debug!("Geocoding '{}' (attempt {}/{})", query, attempt, max_attempts);

        let result = match geocoder.geocode(address).await {
            Ok(result) => result,
            Err(e) if e.is_retryable() => {
                tracing::warn!("Geocoding '{}' failed on attempt {}: {}", query, attempt, e);
                last_failure = e.to_string();
                last_water_point = None;
                continue;
            }
            Err(e) => return Err(e),
        };

        let status = validator.classify(&result.coordinate);
        match (status, result.coordinate.as_point()) {
            (CoordinateStatus::Valid, Some(point)) => return Ok(point),
            (CoordinateStatus::InWater, Some(point)) => {
                let nudged = validator.nudge(&point);
                if validator.is_acceptable(&nudged) {
                    tracing::debug!("Nudged '{}' out of the water to {}", query, nudged);
                    return Ok(nudged);
                }
                tracing::warn!(
                    "Geocoded '{}' into {} on attempt {}",
                    query,
                    validator
                        .water_region_at(&point)
                        .map(|r| r.name.as_str())
                        .unwrap_or("water"),
                    attempt
                );
                last_water_point = Some(point);
            }
            (status, _) => {
                tracing::warn!("Geocoded '{}' to an unusable coordinate: {}", query, status);
                return Err(GeoError::InvalidCoordinate { status });
            }
        }
    }

    match last_water_point {
        Some(point) => Err(GeoError::GeocodingInWater {
            attempts: max_attempts,
            point,
        }),
        None => Err(GeoError::GeocodingFailed {
            attempts: max_attempts,
            message: last_failure,
        }),
    }
}
