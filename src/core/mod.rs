pub mod engine;
pub mod geocode;
pub mod pipeline;
pub mod validator;

pub use crate::domain::model::{AddressRecord, CorrectionOutcome};
pub use crate::domain::ports::{Geocoder, Pipeline, RecordStore};
pub use crate::utils::error::Result;
