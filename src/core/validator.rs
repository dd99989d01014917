use crate::domain::model::{
    CoordinateStatus, GeoPoint, RawCoordinate, RegionBounds, RegionTable, WaterRegion,
};
use crate::domain::ports::{OffsetSource, RandomOffsets};
use crate::utils::error::Result;
use crate::utils::validation::Validate;

/// Classifies coordinates against one region table and repairs the ones that
/// land in water.
#[derive(Debug, Clone, Default)]
pub struct CoordinateValidator {
    table: RegionTable,
}

impl CoordinateValidator {
    /// Takes the table as is. `repair` only guarantees a dry result when the
    /// table passes [`Validate`]: the fallback is returned unchecked.
    pub fn new(table: RegionTable) -> Self {
        Self { table }
    }

    /// Like [`CoordinateValidator::new`], but rejects tables that fail validation.
    pub fn try_new(table: RegionTable) -> Result<Self> {
        table.validate()?;
        Ok(Self::new(table))
    }

    pub fn table(&self) -> &RegionTable {
        &self.table
    }

    /// True when any water region contains the point. Edges count as water.
    pub fn is_in_water(&self, point: &GeoPoint) -> bool {
        self.water_region_at(point).is_some()
    }

    pub fn water_region_at(&self, point: &GeoPoint) -> Option<&WaterRegion> {
        self.table.water_regions.iter().find(|r| r.contains(point))
    }

    pub fn is_in_bounds(&self, point: &GeoPoint, bounds: &RegionBounds) -> bool {
        bounds.contains(point)
    }

    pub fn is_in_service_area(&self, point: &GeoPoint) -> bool {
        point.is_within_world_range() && self.is_in_bounds(point, &self.table.bounds)
    }

    /// The acceptance test every repair candidate has to pass.
    pub fn is_acceptable(&self, point: &GeoPoint) -> bool {
        point.is_finite() && self.is_in_service_area(point) && !self.is_in_water(point)
    }

    /// Reports the first failing check, in the order missing, type, bounds, water.
    pub fn classify(&self, raw: &RawCoordinate) -> CoordinateStatus {
        if raw.is_missing() {
            return CoordinateStatus::Missing;
        }
        match raw.as_point() {
            Some(point) => self.classify_point(&point),
            None => CoordinateStatus::InvalidType,
        }
    }

    pub fn classify_point(&self, point: &GeoPoint) -> CoordinateStatus {
        if !point.is_finite() {
            CoordinateStatus::InvalidType
        } else if !self.is_in_service_area(point) {
            CoordinateStatus::OutOfBounds
        } else if self.is_in_water(point) {
            CoordinateStatus::InWater
        } else {
            CoordinateStatus::Valid
        }
    }

    /// The fixed north-west nudge, before any acceptance test.
    pub fn nudge(&self, point: &GeoPoint) -> GeoPoint {
        point.offset(self.table.repair.nudge_lat, self.table.repair.nudge_lng)
    }

    /// Moves a point out of the water. Never fails: when nothing better turns
    /// up the configured fallback is returned.
    pub fn repair(&self, point: &GeoPoint, city: Option<&str>) -> GeoPoint {
        self.repair_with(point, city, &mut RandomOffsets::from_entropy())
    }

    pub fn repair_with(
        &self,
        point: &GeoPoint,
        city: Option<&str>,
        offsets: &mut dyn OffsetSource,
    ) -> GeoPoint {
        if self.is_acceptable(point) {
            return *point;
        }

        let nudged = self.nudge(point);
        if self.is_acceptable(&nudged) {
            tracing::debug!("Repaired {} with fixed nudge to {}", point, nudged);
            return nudged;
        }

        let safe_default = city.and_then(|c| self.table.safe_default(c));

        if let Some(default) = safe_default {
            if let Some(candidate) = self.search_near(&default.center, offsets) {
                tracing::debug!(
                    "Repaired {} by random search around {} to {}",
                    point,
                    default.name,
                    candidate
                );
                return candidate;
            }
            tracing::debug!(
                "Random search around {} exhausted {} attempts",
                default.name,
                self.table.repair.max_search_attempts
            );
        }

        let center = safe_default
            .map(|d| d.center)
            .unwrap_or(self.table.default_center);
        let shifted = self.shift_to_safe_zone(&center);
        if self.is_acceptable(&shifted) {
            tracing::debug!("Repaired {} by safe-zone shift to {}", point, shifted);
            return shifted;
        }

        tracing::warn!(
            "Could not repair {}, using fallback {}",
            point,
            self.table.fallback
        );
        self.table.fallback
    }

    fn search_near(&self, center: &GeoPoint, offsets: &mut dyn OffsetSource) -> Option<GeoPoint> {
        let settings = &self.table.repair;
        let radius = settings.search_radius;

        (0..settings.max_search_attempts).find_map(|_| {
            let lat_offset = offsets.sample(-radius, radius);
            let lng_offset = offsets.sample(-radius * settings.west_bias, radius * settings.east_bias);
            let candidate = center.offset(lat_offset, lng_offset);
            self.is_acceptable(&candidate).then_some(candidate)
        })
    }

    /// Deterministic shift away from the river and the northern lake.
    pub fn shift_to_safe_zone(&self, center: &GeoPoint) -> GeoPoint {
        let settings = &self.table.repair;
        let mut shifted = *center;

        if let Some(river) = self.table.water_region(&settings.river_region) {
            if river.contains_longitude(center.longitude) {
                shifted.longitude -= settings.river_west_shift;
            } else if center.longitude > river.max_lng {
                shifted.longitude -= settings.east_of_river_west_shift;
            }
        }

        if center.latitude > settings.northern_lake_threshold {
            shifted.latitude -= settings.south_shift;
        }

        shifted
    }
}
