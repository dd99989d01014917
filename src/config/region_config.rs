use crate::adapters::Provider;
use crate::core::geocode::RetryPolicy;
use crate::domain::model::{GeoPoint, RegionTable};
use crate::utils::error::{GeoError, Result};
use crate::utils::validation::{
    validate_finite_at_least, validate_latitude, validate_longitude, validate_non_empty_string,
    validate_ordered, validate_positive_number, validate_unique_names, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// A region table plus the geocoding settings that go with it, as read from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionConfig {
    #[serde(flatten)]
    pub region: RegionTable,
    pub geocoding: Option<GeocodingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeocodingConfig {
    pub provider: Option<Provider>,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub user_agent: Option<String>,
    pub max_attempts: Option<u32>,
    pub backoff_ms: Option<u64>,
    pub min_interval_ms: Option<u64>,
}

impl GeocodingConfig {
    pub fn provider(&self) -> Provider {
        self.provider.unwrap_or_default()
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| self.provider().default_endpoint())
    }

    pub fn user_agent(&self) -> &str {
        self.user_agent
            .as_deref()
            .unwrap_or(concat!("dryland/", env!("CARGO_PKG_VERSION")))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let defaults = RetryPolicy::default();
        RetryPolicy {
            max_attempts: self.max_attempts.unwrap_or(defaults.max_attempts),
            backoff: self
                .backoff_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.backoff),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| self.provider().default_min_interval())
    }
}

impl RegionConfig {
    /// Built-in New Orleans table with default geocoding settings.
    pub fn new_orleans() -> Self {
        Self {
            region: RegionTable::new_orleans(),
            geocoding: None,
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(GeoError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| GeoError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| GeoError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn geocoding(&self) -> GeocodingConfig {
        self.geocoding.clone().unwrap_or_default()
    }
}

impl Validate for RegionConfig {
    fn validate(&self) -> Result<()> {
        self.region.validate()?;

        if let Some(geocoding) = &self.geocoding {
            validate_url("geocoding.endpoint", geocoding.endpoint())?;
            if let Some(attempts) = geocoding.max_attempts {
                validate_positive_number("geocoding.max_attempts", attempts as usize, 1)?;
            }
            if geocoding.provider() == Provider::Google {
                let key = geocoding.api_key.as_deref().unwrap_or_default();
                validate_non_empty_string("geocoding.api_key", key)?;
                if key.starts_with("${") {
                    return Err(GeoError::InvalidConfigValueError {
                        field: "geocoding.api_key".to_string(),
                        value: key.to_string(),
                        reason: "Environment variable is not set".to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

fn validate_point(field_name: &str, point: &GeoPoint) -> Result<()> {
    validate_latitude(&format!("{}.latitude", field_name), point.latitude)?;
    validate_longitude(&format!("{}.longitude", field_name), point.longitude)
}

impl Validate for RegionTable {
    fn validate(&self) -> Result<()> {
        let b = &self.bounds;
        validate_latitude("bounds.min_lat", b.min_lat)?;
        validate_latitude("bounds.max_lat", b.max_lat)?;
        validate_longitude("bounds.min_lng", b.min_lng)?;
        validate_longitude("bounds.max_lng", b.max_lng)?;
        validate_ordered("bounds.lat", b.min_lat, b.max_lat)?;
        validate_ordered("bounds.lng", b.min_lng, b.max_lng)?;

        for region in &self.water_regions {
            validate_non_empty_string("water_regions.name", &region.name)?;
            let field = format!("water_regions[{}]", region.name);
            validate_latitude(&field, region.min_lat)?;
            validate_latitude(&field, region.max_lat)?;
            validate_longitude(&field, region.min_lng)?;
            validate_longitude(&field, region.max_lng)?;
            validate_ordered(&format!("{}.lat", field), region.min_lat, region.max_lat)?;
            validate_ordered(&format!("{}.lng", field), region.min_lng, region.max_lng)?;
        }
        validate_unique_names(
            "water_regions",
            self.water_regions.iter().map(|r| r.name.as_str()),
        )?;

        for default in &self.safe_defaults {
            validate_non_empty_string("safe_defaults.name", &default.name)?;
            validate_point(&format!("safe_defaults[{}]", default.name), &default.center)?;
        }
        validate_unique_names(
            "safe_defaults",
            self.safe_defaults.iter().map(|d| d.name.as_str()),
        )?;

        validate_point("default_center", &self.default_center)?;
        if !self.bounds.contains(&self.default_center) {
            return Err(GeoError::InvalidConfigValueError {
                field: "default_center".to_string(),
                value: self.default_center.to_string(),
                reason: "Default center must lie inside bounds".to_string(),
            });
        }

        // Last resort of repair: it has to be valid on its own.
        validate_point("fallback", &self.fallback)?;
        if !self.bounds.contains(&self.fallback)
            || self.water_regions.iter().any(|r| r.contains(&self.fallback))
        {
            return Err(GeoError::InvalidConfigValueError {
                field: "fallback".to_string(),
                value: self.fallback.to_string(),
                reason: "Fallback must lie inside bounds and outside every water region"
                    .to_string(),
            });
        }

        let repair = &self.repair;
        if !self.water_regions.is_empty() && self.water_region(&repair.river_region).is_none() {
            return Err(GeoError::InvalidConfigValueError {
                field: "repair.river_region".to_string(),
                value: repair.river_region.clone(),
                reason: "No water region with this name".to_string(),
            });
        }
        validate_positive_number("repair.max_search_attempts", repair.max_search_attempts, 1)?;
        validate_finite_at_least("repair.search_radius", repair.search_radius, 0.0)?;
        if repair.search_radius == 0.0 {
            return Err(GeoError::InvalidConfigValueError {
                field: "repair.search_radius".to_string(),
                value: repair.search_radius.to_string(),
                reason: "Radius must be positive".to_string(),
            });
        }
        validate_finite_at_least("repair.west_bias", repair.west_bias, 0.0)?;
        validate_finite_at_least("repair.east_bias", repair.east_bias, 0.0)?;
        validate_finite_at_least("repair.river_west_shift", repair.river_west_shift, 0.0)?;
        validate_finite_at_least(
            "repair.east_of_river_west_shift",
            repair.east_of_river_west_shift,
            0.0,
        )?;
        validate_finite_at_least("repair.south_shift", repair.south_shift, 0.0)?;
        validate_finite_at_least("repair.nudge_lat", repair.nudge_lat, f64::MIN)?;
        validate_finite_at_least("repair.nudge_lng", repair.nudge_lng, f64::MIN)?;
        validate_latitude(
            "repair.northern_lake_threshold",
            repair.northern_lake_threshold,
        )?;

        Ok(())
    }
}
