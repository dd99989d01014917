use crate::domain::model::{
    GeoPoint, RegionBounds, RegionTable, RepairSettings, SafeDefault, WaterRegion,
};

pub const LAKE_PONTCHARTRAIN: &str = "Lake Pontchartrain";
pub const LAKE_BORGNE: &str = "Lake Borgne";
pub const MISSISSIPPI_RIVER: &str = "Mississippi River";

impl RegionTable {
    /// Hand-tuned table for the greater New Orleans area.
    pub fn new_orleans() -> Self {
        Self {
            bounds: RegionBounds {
                min_lat: 29.75,
                max_lat: 30.30,
                min_lng: -90.45,
                max_lng: -89.60,
            },
            water_regions: vec![
                WaterRegion::new(LAKE_PONTCHARTRAIN, 30.00, 30.25, -90.25, -90.00),
                WaterRegion::new(LAKE_BORGNE, 29.95, 30.15, -89.85, -89.55),
                WaterRegion::new(MISSISSIPPI_RIVER, 29.91, 29.965, -90.075, -90.02),
            ],
            safe_defaults: vec![
                SafeDefault::new("New Orleans", 29.9511, -90.0715),
                SafeDefault::new("Metairie", 29.9841, -90.1529),
                SafeDefault::new("Kenner", 29.9941, -90.2417),
                SafeDefault::new("Gretna", 29.9147, -90.0540),
                SafeDefault::new("Chalmette", 29.9427, -89.9634),
                SafeDefault::new("Harahan", 29.9405, -90.2031),
            ],
            default_center: GeoPoint::new(29.9511, -90.0715),
            fallback: GeoPoint::new(29.9490, -90.0900),
            repair: RepairSettings {
                river_region: MISSISSIPPI_RIVER.to_string(),
                ..RepairSettings::default()
            },
        }
    }
}

impl Default for RegionTable {
    fn default() -> Self {
        Self::new_orleans()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validation::Validate;

    #[test]
    fn test_new_orleans_table_is_self_consistent() {
        let table = RegionTable::new_orleans();
        assert!(table.validate().is_ok());
        assert_eq!(table.water_regions.len(), 3);
        assert!(table.water_region(&table.repair.river_region).is_some());
    }

    #[test]
    fn test_fallback_is_dry_land() {
        let table = RegionTable::new_orleans();
        assert!(table.bounds.contains(&table.fallback));
        assert!(!table.water_regions.iter().any(|r| r.contains(&table.fallback)));
    }

    #[test]
    fn test_safe_default_lookup_ignores_case() {
        let table = RegionTable::new_orleans();
        assert!(table.safe_default("metairie").is_some());
        assert!(table.safe_default("  KENNER ").is_some());
        assert!(table.safe_default("Baton Rouge").is_none());
        assert!(table.safe_default("").is_none());
    }
}
