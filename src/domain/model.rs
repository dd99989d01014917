use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Latitude in [-90, 90] and longitude in [-180, 180].
    pub fn is_within_world_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    pub fn offset(&self, d_lat: f64, d_lng: f64) -> Self {
        Self::new(self.latitude + d_lat, self.longitude + d_lng)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// A coordinate exactly as it was found in a record or a provider response.
///
/// `None` and JSON `null` both mean the value is absent. Anything else that is
/// not a finite JSON number (numeric strings included) is present but of the
/// wrong type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCoordinate {
    pub latitude: Option<serde_json::Value>,
    pub longitude: Option<serde_json::Value>,
}

impl RawCoordinate {
    pub fn new(latitude: Option<serde_json::Value>, longitude: Option<serde_json::Value>) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn from_point(point: GeoPoint) -> Self {
        Self {
            latitude: number_value(point.latitude),
            longitude: number_value(point.longitude),
        }
    }

    pub fn is_missing(&self) -> bool {
        is_absent(&self.latitude) || is_absent(&self.longitude)
    }

    /// Both axes as finite numbers, if they are.
    pub fn as_point(&self) -> Option<GeoPoint> {
        let latitude = finite_number(&self.latitude)?;
        let longitude = finite_number(&self.longitude)?;
        Some(GeoPoint::new(latitude, longitude))
    }
}

impl From<GeoPoint> for RawCoordinate {
    fn from(point: GeoPoint) -> Self {
        Self::from_point(point)
    }
}

fn is_absent(value: &Option<serde_json::Value>) -> bool {
    matches!(value, None | Some(serde_json::Value::Null))
}

fn finite_number(value: &Option<serde_json::Value>) -> Option<f64> {
    value
        .as_ref()
        .and_then(|v| v.as_f64())
        .filter(|v| v.is_finite())
}

// serde_json has no representation for NaN or infinity; keep them visible as
// strings so they still classify as the wrong type instead of vanishing.
fn number_value(value: f64) -> Option<serde_json::Value> {
    Some(
        serde_json::Number::from_f64(value)
            .map(serde_json::Value::Number)
            .unwrap_or_else(|| serde_json::Value::String(value.to_string())),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoordinateStatus {
    Valid,
    OutOfBounds,
    InWater,
    Missing,
    InvalidType,
}

impl CoordinateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoordinateStatus::Valid => "VALID",
            CoordinateStatus::OutOfBounds => "OUT_OF_BOUNDS",
            CoordinateStatus::InWater => "IN_WATER",
            CoordinateStatus::Missing => "MISSING",
            CoordinateStatus::InvalidType => "INVALID_TYPE",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "VALID" => Some(CoordinateStatus::Valid),
            "OUT_OF_BOUNDS" => Some(CoordinateStatus::OutOfBounds),
            "IN_WATER" => Some(CoordinateStatus::InWater),
            "MISSING" => Some(CoordinateStatus::Missing),
            "INVALID_TYPE" => Some(CoordinateStatus::InvalidType),
            _ => None,
        }
    }
}

impl fmt::Display for CoordinateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named, inclusive bounding box of unbuildable water.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterRegion {
    pub name: String,
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl WaterRegion {
    pub fn new(name: &str, min_lat: f64, max_lat: f64, min_lng: f64, max_lng: f64) -> Self {
        Self {
            name: name.to_string(),
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        }
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.latitude >= self.min_lat
            && point.latitude <= self.max_lat
            && point.longitude >= self.min_lng
            && point.longitude <= self.max_lng
    }

    pub fn contains_longitude(&self, longitude: f64) -> bool {
        longitude >= self.min_lng && longitude <= self.max_lng
    }
}

/// The service area. Points outside it are rejected before any water test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl RegionBounds {
    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.latitude >= self.min_lat
            && point.latitude <= self.max_lat
            && point.longitude >= self.min_lng
            && point.longitude <= self.max_lng
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeDefault {
    pub name: String,
    pub center: GeoPoint,
}

impl SafeDefault {
    pub fn new(name: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.to_string(),
            center: GeoPoint::new(latitude, longitude),
        }
    }

    pub fn matches(&self, place: &str) -> bool {
        self.name.trim().eq_ignore_ascii_case(place.trim())
    }
}

/// Tuning knobs for the repair pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairSettings {
    pub nudge_lat: f64,
    pub nudge_lng: f64,
    pub search_radius: f64,
    /// Multiplier on the radius for the westward side of the longitude draw.
    pub west_bias: f64,
    pub east_bias: f64,
    pub max_search_attempts: usize,
    /// Name of the water region treated as the river channel.
    pub river_region: String,
    pub river_west_shift: f64,
    pub east_of_river_west_shift: f64,
    pub northern_lake_threshold: f64,
    pub south_shift: f64,
}

impl Default for RepairSettings {
    fn default() -> Self {
        Self {
            nudge_lat: 0.01,
            nudge_lng: -0.01,
            search_radius: 0.03,
            west_bias: 1.4,
            east_bias: 0.6,
            max_search_attempts: 20,
            river_region: "Mississippi River".to_string(),
            river_west_shift: 0.05,
            east_of_river_west_shift: 0.04,
            northern_lake_threshold: 30.0,
            south_shift: 0.05,
        }
    }
}

/// Everything the validator knows about one service area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionTable {
    pub bounds: RegionBounds,
    pub water_regions: Vec<WaterRegion>,
    #[serde(default)]
    pub safe_defaults: Vec<SafeDefault>,
    pub default_center: GeoPoint,
    pub fallback: GeoPoint,
    #[serde(default)]
    pub repair: RepairSettings,
}

impl RegionTable {
    pub fn safe_default(&self, place: &str) -> Option<&SafeDefault> {
        if place.trim().is_empty() {
            return None;
        }
        self.safe_defaults.iter().find(|d| d.matches(place))
    }

    pub fn water_region(&self, name: &str) -> Option<&WaterRegion> {
        self.water_regions
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub line1: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

impl Address {
    pub fn new(line1: &str, city: &str, state: &str, zip: &str) -> Self {
        Self {
            line1: non_blank(line1),
            city: non_blank(city),
            state: non_blank(state),
            zip: non_blank(zip),
        }
    }

    fn parts(&self) -> impl Iterator<Item = &str> {
        [&self.line1, &self.city, &self.state, &self.zip]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .map(str::trim)
            .filter(|part| !part.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.parts().next().is_none()
    }

    /// Single-line form used as a provider query, e.g. `"1 Canal St, New Orleans, LA, 70130"`.
    pub fn one_line(&self) -> String {
        self.parts().collect::<Vec<_>>().join(", ")
    }

    pub fn city(&self) -> Option<&str> {
        self.city.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub coordinate: RawCoordinate,
    pub formatted_address: Option<String>,
}

/// One row of the batch workload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressRecord {
    pub id: String,
    pub address: Address,
    pub coordinate: RawCoordinate,
    pub status: Option<CoordinateStatus>,
    pub corrected: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl AddressRecord {
    pub fn new(id: &str, address: Address, coordinate: RawCoordinate) -> Self {
        Self {
            id: id.to_string(),
            address,
            coordinate,
            status: None,
            corrected: false,
            updated_at: None,
        }
    }

    pub fn mark_corrected(&mut self, point: GeoPoint, status: CoordinateStatus) {
        self.coordinate = RawCoordinate::from_point(point);
        self.status = Some(status);
        self.corrected = true;
        self.updated_at = Some(Utc::now());
    }
}

/// Per-category tallies of one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub total: usize,
    pub valid: usize,
    pub out_of_bounds: usize,
    pub in_water: usize,
    pub missing: usize,
    pub invalid_type: usize,
    pub repaired: usize,
    pub geocoded: usize,
    pub failed: usize,
}

impl BatchReport {
    pub fn record_status(&mut self, status: CoordinateStatus) {
        self.total += 1;
        match status {
            CoordinateStatus::Valid => self.valid += 1,
            CoordinateStatus::OutOfBounds => self.out_of_bounds += 1,
            CoordinateStatus::InWater => self.in_water += 1,
            CoordinateStatus::Missing => self.missing += 1,
            CoordinateStatus::InvalidType => self.invalid_type += 1,
        }
    }

    pub fn corrected(&self) -> usize {
        self.repaired + self.geocoded
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} records: {} valid, {} in water, {} out of bounds, {} missing, {} invalid type; \
             {} repaired, {} geocoded, {} failed",
            self.total,
            self.valid,
            self.in_water,
            self.out_of_bounds,
            self.missing,
            self.invalid_type,
            self.repaired,
            self.geocoded,
            self.failed
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct CorrectionOutcome {
    pub records: Vec<AddressRecord>,
    pub report: BatchReport,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_batch_report_tallies() {
        let mut report = BatchReport::default();
        report.record_status(CoordinateStatus::Valid);
        report.record_status(CoordinateStatus::InWater);
        report.record_status(CoordinateStatus::InWater);
        report.repaired = 2;
        assert_eq!(report.total, 3);
        assert_eq!(report.in_water, 2);
        assert_eq!(report.corrected(), 2);
        assert!(report.to_string().starts_with("3 records: 1 valid, 2 in water"));
    }

    #[test]
    fn test_raw_coordinate_missing_and_null() {
        let raw = RawCoordinate::new(None, Some(json!(-90.08)));
        assert!(raw.is_missing());

        let raw = RawCoordinate::new(Some(serde_json::Value::Null), Some(json!(-90.08)));
        assert!(raw.is_missing());
        assert!(raw.as_point().is_none());
    }

    #[test]
    fn test_raw_coordinate_rejects_numeric_strings() {
        let raw = RawCoordinate::new(Some(json!("29.95")), Some(json!(-90.07)));
        assert!(!raw.is_missing());
        assert!(raw.as_point().is_none());
    }

    #[test]
    fn test_non_finite_point_survives_as_string() {
        let raw = RawCoordinate::from_point(GeoPoint::new(f64::NAN, -90.0));
        assert!(!raw.is_missing());
        assert!(raw.as_point().is_none());
    }

    #[test]
    fn test_region_contains_is_inclusive() {
        let lake = WaterRegion::new("Lake", 30.0, 30.25, -90.25, -90.0);
        assert!(lake.contains(&GeoPoint::new(30.0, -90.25)));
        assert!(lake.contains(&GeoPoint::new(30.25, -90.0)));
        assert!(!lake.contains(&GeoPoint::new(29.9999, -90.1)));
    }

    #[test]
    fn test_address_one_line_skips_blanks() {
        let address = Address::new("1 Canal St", " New Orleans ", "", "70130");
        assert_eq!(address.one_line(), "1 Canal St, New Orleans, 70130");
        assert_eq!(address.city(), Some("New Orleans"));
        assert!(Address::default().is_empty());
        assert!(Address::new(" ", "", "", "").is_empty());
    }

    #[test]
    fn test_status_strings() {
        for status in [
            CoordinateStatus::Valid,
            CoordinateStatus::OutOfBounds,
            CoordinateStatus::InWater,
            CoordinateStatus::Missing,
            CoordinateStatus::InvalidType,
        ] {
            assert_eq!(CoordinateStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(
            serde_json::to_string(&CoordinateStatus::InWater).unwrap(),
            "\"IN_WATER\""
        );
    }
}
