use crate::core::geocode::{geocode_and_validate, RetryPolicy};
use crate::core::validator::CoordinateValidator;
use crate::core::{AddressRecord, CorrectionOutcome, Geocoder, Pipeline, RecordStore, Result};
use crate::domain::model::{BatchReport, CoordinateStatus, GeoPoint};
use crate::domain::ports::RandomOffsets;
use crate::utils::error::GeoError;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum CorrectionMode {
    /// Classify and count only.
    #[default]
    Audit,
    /// Repair coordinates that fall in water, without calling a provider.
    Repair,
    /// Re-geocode every unusable coordinate, repairing locally as a fallback.
    Geocode,
}

pub struct CorrectionPipeline<S: RecordStore> {
    store: S,
    validator: CoordinateValidator,
    mode: CorrectionMode,
    geocoder: Option<Arc<dyn Geocoder>>,
    policy: RetryPolicy,
    offsets: Mutex<RandomOffsets<StdRng>>,
}

impl<S: RecordStore> CorrectionPipeline<S> {
    pub fn new(store: S, validator: CoordinateValidator, mode: CorrectionMode) -> Self {
        Self {
            store,
            validator,
            mode,
            geocoder: None,
            policy: RetryPolicy::default(),
            offsets: Mutex::new(RandomOffsets::from_entropy()),
        }
    }

    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>, policy: RetryPolicy) -> Self {
        self.geocoder = Some(geocoder);
        self.policy = policy;
        self
    }

    /// Fixes the random search so reruns over the same input agree.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.offsets = Mutex::new(RandomOffsets::seeded(seed));
        self
    }

    fn repair_locally(&self, point: &GeoPoint, city: Option<&str>) -> GeoPoint {
        match self.offsets.lock() {
            Ok(mut offsets) => self.validator.repair_with(point, city, &mut *offsets),
            Err(_) => self.validator.repair(point, city),
        }
    }

    fn apply_repair(&self, record: &mut AddressRecord, point: GeoPoint, report: &mut BatchReport) {
        let repaired = self.repair_locally(&point, record.address.city());
        tracing::debug!("Record {}: repaired {} -> {}", record.id, point, repaired);
        record.mark_corrected(repaired, self.validator.classify_point(&repaired));
        report.repaired += 1;
    }

    async fn geocode_record(
        &self,
        record: &mut AddressRecord,
        status: CoordinateStatus,
        report: &mut BatchReport,
    ) {
        let geocoder = match &self.geocoder {
            Some(geocoder) if !record.address.is_empty() => geocoder,
            _ => {
                match (status, record.coordinate.as_point()) {
                    (CoordinateStatus::InWater, Some(point)) => {
                        self.apply_repair(record, point, report)
                    }
                    _ => {
                        tracing::warn!("Record {}: {} and nothing to geocode", record.id, status);
                        report.failed += 1;
                    }
                }
                return;
            }
        };

        match geocode_and_validate(&self.validator, geocoder.as_ref(), &record.address, &self.policy)
            .await
        {
            Ok(point) => {
                tracing::debug!("Record {}: geocoded to {}", record.id, point);
                record.mark_corrected(point, self.validator.classify_point(&point));
                report.geocoded += 1;
            }
            Err(GeoError::GeocodingInWater { point, attempts }) => {
                tracing::info!(
                    "Record {}: still in water after {} attempt(s), repairing locally",
                    record.id,
                    attempts
                );
                self.apply_repair(record, point, report);
            }
            Err(e) => {
                tracing::warn!("Record {}: {}", record.id, e);
                report.failed += 1;
            }
        }
    }
}

#[async_trait::async_trait]
impl<S: RecordStore> Pipeline for CorrectionPipeline<S> {
    async fn extract(&self) -> Result<Vec<AddressRecord>> {
        let records = self.store.load_records().await?;
        tracing::debug!("Loaded {} records", records.len());
        Ok(records)
    }

    async fn transform(&self, records: Vec<AddressRecord>) -> Result<CorrectionOutcome> {
        let mut report = BatchReport::default();
        let mut processed = Vec::with_capacity(records.len());

        for mut record in records {
            let status = self.validator.classify(&record.coordinate);
            report.record_status(status);
            record.status = Some(status);

            match self.mode {
                CorrectionMode::Audit => {}
                CorrectionMode::Repair => {
                    if let (CoordinateStatus::InWater, Some(point)) =
                        (status, record.coordinate.as_point())
                    {
                        self.apply_repair(&mut record, point, &mut report);
                    }
                }
                CorrectionMode::Geocode => {
                    if status != CoordinateStatus::Valid {
                        self.geocode_record(&mut record, status, &mut report).await;
                    }
                }
            }

            processed.push(record);
        }

        Ok(CorrectionOutcome {
            records: processed,
            report,
        })
    }

    async fn load(&self, outcome: &CorrectionOutcome) -> Result<String> {
        let location = self.store.save_records(&outcome.records).await?;
        tracing::debug!("Saved {} records to {}", outcome.records.len(), location);
        Ok(location)
    }
}
