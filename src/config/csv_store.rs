use crate::adapters::coordinate_value;
use crate::core::RecordStore;
use crate::domain::model::{Address, AddressRecord, CoordinateStatus, RawCoordinate};
use crate::utils::error::{GeoError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct InputRow {
    id: String,
    line1: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zip: Option<String>,
    latitude: Option<String>,
    longitude: Option<String>,
    status: Option<String>,
    corrected: Option<bool>,
    updated_at: Option<String>,
}

#[derive(Debug, Serialize)]
struct OutputRow<'a> {
    id: &'a str,
    line1: &'a str,
    city: &'a str,
    state: &'a str,
    zip: &'a str,
    latitude: String,
    longitude: String,
    status: &'static str,
    corrected: bool,
    updated_at: String,
}

/// Address records in CSV files: `id,line1,city,state,zip,latitude,longitude`
/// in, the same plus `status,corrected,updated_at` out.
#[derive(Debug, Clone)]
pub struct CsvRecordStore {
    input_path: PathBuf,
    output_path: PathBuf,
}

impl CsvRecordStore {
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
        }
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    fn parse_row(row: InputRow) -> Result<AddressRecord> {
        let updated_at = match row.updated_at.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(text) => Some(
                DateTime::parse_from_rfc3339(text)
                    .map_err(|e| GeoError::ValidationError {
                        message: format!("Record {}: bad updated_at '{}': {}", row.id, text, e),
                    })?
                    .with_timezone(&Utc),
            ),
        };

        Ok(AddressRecord {
            address: Address {
                line1: row.line1,
                city: row.city,
                state: row.state,
                zip: row.zip,
            },
            coordinate: RawCoordinate::new(
                coordinate_value(row.latitude.map(serde_json::Value::String)),
                coordinate_value(row.longitude.map(serde_json::Value::String)),
            ),
            status: row.status.as_deref().and_then(CoordinateStatus::parse),
            corrected: row.corrected.unwrap_or(false),
            updated_at,
            id: row.id,
        })
    }
}

fn cell(value: &Option<serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

impl RecordStore for CsvRecordStore {
    async fn load_records(&self) -> Result<Vec<AddressRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.input_path)?;

        let mut records = Vec::new();
        for row in reader.deserialize::<InputRow>() {
            records.push(Self::parse_row(row?)?);
        }
        Ok(records)
    }

    async fn save_records(&self, records: &[AddressRecord]) -> Result<String> {
        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut writer = csv::Writer::from_path(&self.output_path)?;
        for record in records {
            writer.serialize(OutputRow {
                id: &record.id,
                line1: record.address.line1.as_deref().unwrap_or_default(),
                city: record.address.city.as_deref().unwrap_or_default(),
                state: record.address.state.as_deref().unwrap_or_default(),
                zip: record.address.zip.as_deref().unwrap_or_default(),
                latitude: cell(&record.coordinate.latitude),
                longitude: cell(&record.coordinate.longitude),
                status: record.status.map(|s| s.as_str()).unwrap_or_default(),
                corrected: record.corrected,
                updated_at: record
                    .updated_at
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_default(),
            })?;
        }
        writer.flush()?;

        Ok(self.output_path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::GeoPoint;
    use serde_json::json;
    use tempfile::TempDir;

    const INPUT: &str = "\
id,line1,city,state,zip,latitude,longitude
r1,1 Canal St,New Orleans,LA,70130,29.9489,-90.0637
r2,,Metairie,LA,,,-90.15
r3,2 Main St,Kenner,LA,70062,abc,-90.24
";

    #[tokio::test]
    async fn test_load_records_keeps_raw_values() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.csv");
        std::fs::write(&input, INPUT).unwrap();

        let store = CsvRecordStore::new(&input, dir.path().join("out.csv"));
        let records = store.load_records().await.unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(
            records[0].coordinate.as_point(),
            Some(GeoPoint::new(29.9489, -90.0637))
        );
        assert_eq!(records[0].address.city(), Some("New Orleans"));
        assert!(records[1].coordinate.is_missing());
        assert!(records[1].address.line1.is_none());
        assert_eq!(records[2].coordinate.latitude, Some(json!("abc")));
        assert!(records[2].status.is_none());
    }

    #[tokio::test]
    async fn test_save_records_writes_status_columns() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("nested").join("out.csv");
        let store = CsvRecordStore::new(dir.path().join("in.csv"), &output);

        let mut record = AddressRecord::new(
            "r1",
            Address::new("1 Canal St", "New Orleans", "LA", "70130"),
            RawCoordinate::new(Some(json!(30.05)), Some(json!(-90.1))),
        );
        record.mark_corrected(GeoPoint::new(29.9511, -90.1215), CoordinateStatus::Valid);

        let location = store.save_records(&[record]).await.unwrap();
        assert_eq!(location, output.display().to_string());

        let written = std::fs::read_to_string(&output).unwrap();
        let mut lines = written.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id,line1,city,state,zip,latitude,longitude,status,corrected,updated_at"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("r1,1 Canal St,New Orleans,LA,70130,29.9511,-90.1215,VALID,true,"));
    }

    #[tokio::test]
    async fn test_saved_output_loads_back() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("first.csv");
        std::fs::write(&first, INPUT).unwrap();
        let second = dir.path().join("second.csv");

        let store = CsvRecordStore::new(&first, &second);
        let mut records = store.load_records().await.unwrap();
        records[0].mark_corrected(GeoPoint::new(29.95, -90.08), CoordinateStatus::Valid);
        store.save_records(&records).await.unwrap();

        let reloaded = CsvRecordStore::new(&second, dir.path().join("unused.csv"))
            .load_records()
            .await
            .unwrap();
        assert_eq!(reloaded.len(), 3);
        assert!(reloaded[0].corrected);
        assert_eq!(reloaded[0].status, Some(CoordinateStatus::Valid));
        assert!(reloaded[0].updated_at.is_some());
        assert_eq!(reloaded[2].coordinate.latitude, Some(json!("abc")));
    }

    #[tokio::test]
    async fn test_missing_input_is_error() {
        let dir = TempDir::new().unwrap();
        let store = CsvRecordStore::new(dir.path().join("absent.csv"), dir.path().join("out.csv"));
        assert!(store.load_records().await.is_err());
    }
}
