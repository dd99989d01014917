use dryland::adapters::NominatimGeocoder;
use dryland::{
    BatchEngine, CoordinateStatus, CoordinateValidator, CorrectionMode, CorrectionPipeline,
    CsvRecordStore, RegionConfig, RetryPolicy,
};
use httpmock::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const RECORDS: &str = "\
id,line1,city,state,zip,latitude,longitude
dry,3301 Veterans Blvd,Metairie,LA,70002,29.9841,-90.1529
lake,100 Lakeshore Dr,New Orleans,LA,70124,30.05,-90.1
river,1 Canal St,New Orleans,LA,70130,29.94,-90.05
blank,,,,,,
nyc,350 5th Ave,New York,NY,10118,40.7484,-73.9857
";

fn write_input(dir: &TempDir) -> std::path::PathBuf {
    let input = dir.path().join("records.csv");
    std::fs::write(&input, RECORDS).unwrap();
    input
}

fn read_rows(path: &std::path::Path) -> Vec<csv::StringRecord> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    reader.records().map(|r| r.unwrap()).collect()
}

fn validator() -> CoordinateValidator {
    CoordinateValidator::new(RegionConfig::new_orleans().region)
}

#[tokio::test]
async fn test_audit_run_reports_every_category() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir);
    let output = dir.path().join("out").join("audit.csv");

    let store = CsvRecordStore::new(&input, &output);
    let pipeline = CorrectionPipeline::new(store, validator(), CorrectionMode::Audit);
    let summary = BatchEngine::new(pipeline).run().await.unwrap();

    assert_eq!(summary.report.total, 5);
    assert_eq!(summary.report.valid, 1);
    assert_eq!(summary.report.in_water, 2);
    assert_eq!(summary.report.missing, 1);
    assert_eq!(summary.report.out_of_bounds, 1);
    assert_eq!(summary.report.corrected(), 0);

    let rows = read_rows(&output);
    let statuses: Vec<&str> = rows.iter().map(|r| &r[7]).collect();
    assert_eq!(
        statuses,
        vec!["VALID", "IN_WATER", "IN_WATER", "MISSING", "OUT_OF_BOUNDS"]
    );
    assert!(rows.iter().all(|r| &r[8] == "false"));
}

#[tokio::test]
async fn test_repair_run_moves_water_records_to_land() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir);
    let output = dir.path().join("repaired.csv");

    let store = CsvRecordStore::new(&input, &output);
    let pipeline =
        CorrectionPipeline::new(store, validator(), CorrectionMode::Repair).with_seed(5);
    let summary = BatchEngine::new(pipeline).run().await.unwrap();

    assert_eq!(summary.report.repaired, 2);
    assert_eq!(summary.output.as_deref(), Some(output.display().to_string().as_str()));

    let reloaded = dryland::domain::ports::RecordStore::load_records(&CsvRecordStore::new(
        &output,
        dir.path().join("unused.csv"),
    ))
    .await
    .unwrap();

    let v = validator();
    for record in &reloaded {
        if record.corrected {
            assert_eq!(v.classify(&record.coordinate), CoordinateStatus::Valid);
            assert!(record.updated_at.is_some());
        }
    }
    assert_eq!(reloaded.iter().filter(|r| r.corrected).count(), 2);
    // untouched rows keep their original status
    assert_eq!(reloaded[4].status, Some(CoordinateStatus::OutOfBounds));
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir);
    let output = dir.path().join("never.csv");

    let store = CsvRecordStore::new(&input, &output);
    let pipeline = CorrectionPipeline::new(store, validator(), CorrectionMode::Repair);
    let summary = BatchEngine::new(pipeline).dry_run(true).run().await.unwrap();

    assert_eq!(summary.report.repaired, 2);
    assert!(summary.output.is_none());
    assert!(!output.exists());
}

#[tokio::test]
async fn test_geocode_run_against_nominatim() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir);
    let output = dir.path().join("geocoded.csv");

    let server = MockServer::start();
    let lakeshore = server.mock(|when, then| {
        when.method(GET)
            .path("/search")
            .query_param("q", "100 Lakeshore Dr, New Orleans, LA, 70124");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([
                {"lat": "29.9969", "lon": "-90.0685", "display_name": "Lakeshore Drive"}
            ]));
    });
    let canal = server.mock(|when, then| {
        when.method(GET)
            .path("/search")
            .query_param("q", "1 Canal St, New Orleans, LA, 70130");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([
                {"lat": "29.9489", "lon": "-90.0637", "display_name": "Canal Street"}
            ]));
    });
    let empire_state = server.mock(|when, then| {
        when.method(GET)
            .path("/search")
            .query_param("q", "350 5th Ave, New York, NY, 10118");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([
                {"lat": "40.7484", "lon": "-73.9857", "display_name": "Empire State Building"}
            ]));
    });

    let geocoder = Arc::new(NominatimGeocoder::new(
        &server.base_url(),
        "dryland-tests",
        Duration::from_millis(5),
    ));
    let policy = RetryPolicy {
        max_attempts: 2,
        backoff: Duration::from_millis(5),
    };

    let store = CsvRecordStore::new(&input, &output);
    let pipeline = CorrectionPipeline::new(store, validator(), CorrectionMode::Geocode)
        .with_geocoder(geocoder, policy)
        .with_seed(3);
    let summary = BatchEngine::new(pipeline).run().await.unwrap();

    // Lakeshore geocodes cleanly. Canal Street comes back in the river twice and
    // is repaired locally. New York is rejected. The blank row has nothing to send.
    lakeshore.assert_hits(1);
    canal.assert_hits(2);
    empire_state.assert_hits(1);

    assert_eq!(summary.report.geocoded, 1);
    assert_eq!(summary.report.repaired, 1);
    assert_eq!(summary.report.failed, 2);

    let rows = read_rows(&output);
    assert_eq!(&rows[1][5], "29.9969");
    assert_eq!(&rows[1][6], "-90.0685");
    assert_eq!(&rows[1][7], "VALID");
    assert_eq!(&rows[2][7], "VALID");
    assert_eq!(&rows[2][8], "true");
    assert_eq!(&rows[3][8], "false");
    assert_eq!(&rows[4][7], "OUT_OF_BOUNDS");
}
