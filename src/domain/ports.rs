use crate::domain::model::{Address, AddressRecord, CorrectionOutcome, GeocodeResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// External geocoding provider. Rate limiting is the implementation's concern.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &Address) -> Result<GeocodeResult>;
}

/// Source of the random offsets used by the bounded search step of repair.
pub trait OffsetSource {
    fn sample(&mut self, low: f64, high: f64) -> f64;
}

pub struct RandomOffsets<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomOffsets<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomOffsets<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> OffsetSource for RandomOffsets<R> {
    /// Returns `low` for an empty or non-finite range instead of drawing.
    fn sample(&mut self, low: f64, high: f64) -> f64 {
        if !low.is_finite() || !high.is_finite() || low >= high {
            return low;
        }
        self.rng.gen_range(low..=high)
    }
}

/// Replays a fixed list of values, clamped into the requested range.
/// Once the list runs out every draw returns the range midpoint.
#[derive(Debug, Clone, Default)]
pub struct ScriptedOffsets {
    values: VecDeque<f64>,
}

impl ScriptedOffsets {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

impl OffsetSource for ScriptedOffsets {
    fn sample(&mut self, low: f64, high: f64) -> f64 {
        match self.values.pop_front() {
            Some(value) => value.clamp(low.min(high), high.max(low)),
            None => (low + high) / 2.0,
        }
    }
}

pub trait RecordStore: Send + Sync {
    fn load_records(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<AddressRecord>>> + Send;
    fn save_records(
        &self,
        records: &[AddressRecord],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<AddressRecord>>;
    async fn transform(&self, records: Vec<AddressRecord>) -> Result<CorrectionOutcome>;
    async fn load(&self, outcome: &CorrectionOutcome) -> Result<String>;
}
