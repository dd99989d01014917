pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::config::{csv_store::CsvRecordStore, region_config::RegionConfig};
pub use crate::core::{
    engine::{BatchEngine, RunSummary},
    geocode::{geocode_and_validate, RetryPolicy},
    pipeline::{CorrectionMode, CorrectionPipeline},
    validator::CoordinateValidator,
};
pub use crate::domain::model::{
    Address, AddressRecord, BatchReport, CoordinateStatus, GeoPoint, GeocodeResult, RawCoordinate,
    RegionBounds, RegionTable, RepairSettings, SafeDefault, WaterRegion,
};
pub use crate::domain::ports::{Geocoder, OffsetSource, RandomOffsets, ScriptedOffsets};
pub use crate::utils::error::{GeoError, Result};
