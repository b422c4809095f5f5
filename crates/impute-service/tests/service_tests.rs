//! Integration tests for the imputation service.
//!
//! These run the full upload → process → download → cleanup workflow over
//! a filesystem store in a temporary directory.

use impute_engine::{ImputeError, PreviewValue, load};
use impute_service::{FsArtifactStore, ImputationService, ServiceConfig, ServiceError};
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

// ============================================================================
// Helper Functions
// ============================================================================

const TS: i64 = 1700000000;

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn read_fixture(filename: &str) -> Vec<u8> {
    std::fs::read(fixtures_path().join(filename)).expect("Failed to read fixture")
}

fn service_in(dir: &Path) -> ImputationService {
    let config = ServiceConfig::builder()
        .storage_dir(dir)
        .preview_rows(3)
        .build()
        .expect("Invalid config");
    ImputationService::open(config).expect("Failed to open service")
}

fn stored_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// ============================================================================
// Workflow Tests
// ============================================================================

#[test]
fn test_full_workflow_on_disk() {
    let dir = TempDir::new().unwrap();
    let service = service_in(dir.path());

    let upload = service
        .upload_at("sales.csv", &read_fixture("sales.csv"), TS)
        .unwrap();
    assert_eq!(upload.file_info.filename, "1700000000_sales.csv");
    assert_eq!(upload.file_info.rows, 5);
    assert_eq!(
        upload.file_info.column_names,
        vec!["region", "units", "revenue", "manager"]
    );

    let processed = service.process(&upload.file_info.filename).unwrap();
    let stats = &processed.stats;
    assert_eq!(processed.numeric_columns, vec!["units", "revenue"]);
    assert_eq!(stats.imputed_counts["units"], 2);
    assert_eq!(stats.imputed_counts["revenue"], 2);
    assert_eq!(stats.column_means["revenue"], 1230.25);
    assert_eq!(stats.total_imputations, 4);
    assert_eq!(stats.missing_data_rate, 40.0);

    // Preview honours the configured row limit
    assert_eq!(processed.preview_data.len(), 3);
    assert_eq!(processed.imputation_flags["units"], vec![false, true, false]);
    assert_eq!(processed.imputation_flags["revenue"], vec![false, false, true]);
    assert_eq!(
        processed.preview_data[2].get("revenue"),
        Some(&PreviewValue::Float(1230.25))
    );

    let download = service.download(&processed.processed_filename).unwrap();
    assert_eq!(download.download_name, "imputed_sales.csv");

    let reloaded = load(&download.bytes).unwrap();
    assert_eq!(reloaded.row_count(), 5);
    assert_eq!(reloaded.column("units").unwrap().missing_count(), 0);
    assert_eq!(reloaded.column("revenue").unwrap().missing_count(), 0);
    assert_eq!(reloaded.column("manager").unwrap().missing_count(), 1);

    assert_eq!(
        stored_files(dir.path()),
        vec!["1700000000_sales.csv", "processed_1700000000_sales.csv"]
    );

    let cleanup = service
        .cleanup(&[
            upload.file_info.filename.clone(),
            processed.processed_filename.clone(),
        ])
        .unwrap();
    assert_eq!(cleanup.cleaned_files.len(), 2);
    assert!(stored_files(dir.path()).is_empty());
}

#[test]
fn test_uploads_are_separate_snapshots() {
    let dir = TempDir::new().unwrap();
    let service = service_in(dir.path());
    let bytes = read_fixture("sales.csv");

    let first = service.upload_at("sales.csv", &bytes, TS).unwrap();
    let second = service.upload_at("sales.csv", &bytes, TS + 1).unwrap();

    assert_ne!(first.file_info.filename, second.file_info.filename);
    assert_eq!(stored_files(dir.path()).len(), 2);
}

#[test]
fn test_same_second_uploads_do_not_overwrite() {
    let dir = TempDir::new().unwrap();
    let service = service_in(dir.path());
    let sales = read_fixture("sales.csv");

    let first = service.upload_at("d.csv", &sales, TS).unwrap().file_info.filename;
    let second = service
        .upload_at("d.csv", b"v\n1\n", TS)
        .unwrap()
        .file_info
        .filename;
    assert!(service.upload_at("d.csv", b"", TS).is_err());

    assert_eq!(stored_files(dir.path()), vec!["1700000000-1_d.csv", "1700000000_d.csv"]);
    assert_eq!(second, "1700000000-1_d.csv");
    assert_eq!(std::fs::read(dir.path().join(&first)).unwrap(), sales);

    let processed = service.process(&first).unwrap();
    assert_eq!(processed.stats.total_rows, 5);
    let download = service.download(&processed.processed_filename).unwrap();
    assert_eq!(download.download_name, "imputed_d.csv");
}

#[test]
fn test_store_can_be_shared() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FsArtifactStore::open(dir.path()).unwrap());
    let config = ServiceConfig::builder().storage_dir(dir.path()).build().unwrap();

    let uploader = ImputationService::new(config.clone(), store.clone());
    let processor = ImputationService::new(config, store);

    let key = uploader
        .upload_at("sales.csv", &read_fixture("sales.csv"), TS)
        .unwrap()
        .file_info
        .filename;
    let response = processor.process(&key).unwrap();
    assert_eq!(response.stats.total_rows, 5);
}

// ============================================================================
// Error Tests
// ============================================================================

#[test]
fn test_rejects_non_csv_upload() {
    let dir = TempDir::new().unwrap();
    let service = service_in(dir.path());

    let result = service.upload_at("notes.txt", &read_fixture("notes.txt"), TS);
    let err = result.unwrap_err();

    assert_eq!(err.error_code(), "UNSUPPORTED_FILE_TYPE");
    assert!(err.is_client_error());
    assert!(stored_files(dir.path()).is_empty());
}

#[test]
fn test_text_only_upload_fails_on_process() {
    let dir = TempDir::new().unwrap();
    let service = service_in(dir.path());

    let key = service
        .upload_at("labels.csv", &read_fixture("labels.csv"), TS)
        .unwrap()
        .file_info
        .filename;
    let err = service.process(&key).unwrap_err();

    assert!(matches!(err, ServiceError::Engine(ImputeError::NoNumericData)));
    assert_eq!(
        serde_json::to_value(&err).unwrap(),
        serde_json::json!({
            "code": "NO_NUMERIC_DATA",
            "message": "No numeric columns found for imputation"
        })
    );
    // No processed artifact is written on failure
    assert_eq!(stored_files(dir.path()), vec!["1700000000_labels.csv"]);
}

#[test]
fn test_payload_limit() {
    let dir = TempDir::new().unwrap();
    let config = ServiceConfig::builder()
        .storage_dir(dir.path())
        .max_upload_bytes(16)
        .build()
        .unwrap();
    let service = ImputationService::open(config).unwrap();

    let err = service
        .upload_at("sales.csv", &read_fixture("sales.csv"), TS)
        .unwrap_err();
    assert_eq!(err.error_code(), "PAYLOAD_TOO_LARGE");
}

#[test]
fn test_traversal_keys_are_rejected() {
    let dir = TempDir::new().unwrap();
    let service = service_in(dir.path());

    let err = service.process("../sales.csv").unwrap_err();
    assert_eq!(err.error_code(), "INVALID_KEY");

    let err = service.download("..").unwrap_err();
    assert_eq!(err.error_code(), "INVALID_KEY");
}

// ============================================================================
// Serialization Tests
// ============================================================================

#[test]
fn test_process_response_json_shape() {
    let dir = TempDir::new().unwrap();
    let service = service_in(dir.path());
    let key = service
        .upload_at("sales.csv", &read_fixture("sales.csv"), TS)
        .unwrap()
        .file_info
        .filename;

    let json = serde_json::to_value(service.process(&key).unwrap()).unwrap();

    assert_eq!(json["status"], "success");
    assert_eq!(json["processed_filename"], "processed_1700000000_sales.csv");
    assert_eq!(json["stats"]["total_imputations"], 4);
    assert_eq!(json["preview_data"][0]["region"], "north");
    assert_eq!(json["preview_data"][0]["units"], 12);
    assert_eq!(json["preview_data"][1]["revenue"], 980.25);
    assert_eq!(json["preview_data"][2]["units"], 7);
    assert_eq!(json["imputation_flags"]["units"][1], true);
}

#[test]
fn test_download_json_omits_bytes() {
    let dir = TempDir::new().unwrap();
    let service = service_in(dir.path());
    let key = service
        .upload_at("sales.csv", &read_fixture("sales.csv"), TS)
        .unwrap()
        .file_info
        .filename;
    let processed = service.process(&key).unwrap().processed_filename;

    let json = serde_json::to_value(service.download(&processed).unwrap()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "filename": "processed_1700000000_sales.csv",
            "download_name": "imputed_sales.csv"
        })
    );
}
