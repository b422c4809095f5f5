//! The imputation service: upload, process, download and cleanup over an
//! [`ArtifactStore`].

use crate::config::ServiceConfig;
use crate::error::{Result, ServiceError};
use crate::naming;
use crate::store::{ArtifactStore, FsArtifactStore, StoreError};
use impute_engine::{ImputationReport, ImputeError, MeanImputer, PreviewRow, load_with, write_csv};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

const STATUS_SUCCESS: &str = "success";

/// Same-second uploads of one name tried before giving up.
const MAX_KEY_ATTEMPTS: u32 = 1000;

// ============================================================================
// Response Types
// ============================================================================

/// Service liveness and the operations it offers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub message: String,
    /// Operation name → short description.
    pub operations: BTreeMap<String, String>,
}

/// Summary of a stored upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileInfo {
    /// Storage key of the upload; pass this to `process`.
    pub filename: String,
    pub original_filename: String,
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
    /// Size of the upload in bytes.
    pub file_size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadResponse {
    pub status: String,
    pub message: String,
    pub file_info: FileInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessResponse {
    pub status: String,
    pub message: String,
    pub stats: ImputationReport,
    pub preview_data: Vec<PreviewRow>,
    pub imputation_flags: BTreeMap<String, Vec<bool>>,
    /// Storage key of the processed artifact; pass this to `download`.
    pub processed_filename: String,
    pub numeric_columns: Vec<String>,
}

/// A processed artifact ready to hand to the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Download {
    pub filename: String,
    /// Name suggested to the client, e.g. `imputed_data.csv`.
    pub download_name: String,
    #[serde(skip_serializing)]
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanupResponse {
    pub status: String,
    pub message: String,
    /// Keys that existed and were removed.
    pub cleaned_files: Vec<String>,
}

// ============================================================================
// Service
// ============================================================================

/// Mean-imputation service over injected artifact storage.
///
/// Every call is independent; uploads are immutable snapshots keyed by
/// their upload timestamp.
pub struct ImputationService {
    config: ServiceConfig,
    store: Arc<dyn ArtifactStore>,
}

impl ImputationService {
    /// Create a service over an existing store.
    pub fn new(config: ServiceConfig, store: Arc<dyn ArtifactStore>) -> Self {
        Self { config, store }
    }

    /// Create a service backed by a filesystem store at `config.storage_dir`.
    pub fn open(config: ServiceConfig) -> Result<Self> {
        let store = FsArtifactStore::open(&config.storage_dir)?;
        Ok(Self::new(config, Arc::new(store)))
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn health(&self) -> HealthStatus {
        let operations = [
            ("upload", "Store a CSV file and describe its shape"),
            ("process", "Impute missing numeric values with column means"),
            ("download", "Fetch a processed CSV file"),
            ("cleanup", "Remove stored files"),
        ]
        .into_iter()
        .map(|(name, description)| (name.to_string(), description.to_string()))
        .collect();

        HealthStatus {
            status: STATUS_SUCCESS.to_string(),
            message: "CSV imputation service is running".to_string(),
            operations,
        }
    }

    /// Store an upload under a fresh timestamped key.
    pub fn upload(&self, original_filename: &str, bytes: &[u8]) -> Result<UploadResponse> {
        self.upload_at(original_filename, bytes, chrono::Utc::now().timestamp())
    }

    /// [`upload`](Self::upload) with an explicit timestamp (seconds since epoch).
    ///
    /// # Errors
    ///
    /// - [`ServiceError::MissingFilename`] for an empty filename
    /// - [`ServiceError::UnsupportedFileType`] when the extension is not allowed
    /// - [`ServiceError::PayloadTooLarge`] above `max_upload_bytes`
    /// - [`ImputeError::UnparseableInput`] when the bytes are not a CSV table;
    ///   nothing is left in the store in that case
    pub fn upload_at(
        &self,
        original_filename: &str,
        bytes: &[u8],
        timestamp: i64,
    ) -> Result<UploadResponse> {
        let original_filename = original_filename.trim();
        if original_filename.is_empty() {
            return Err(ServiceError::MissingFilename);
        }

        let extension = &self.config.allowed_extension;
        if !naming::has_extension(original_filename, extension) {
            return Err(ServiceError::UnsupportedFileType(
                original_filename.to_string(),
            ));
        }

        let size = bytes.len() as u64;
        if size > self.config.max_upload_bytes {
            return Err(ServiceError::PayloadTooLarge {
                size,
                limit: self.config.max_upload_bytes,
            });
        }

        let mut sanitized = naming::sanitize_filename(original_filename);
        if !naming::has_extension(&sanitized, extension) {
            sanitized = format!("upload.{}", extension.trim_start_matches('.'));
        }
        let key = self.store_new_upload(timestamp, &sanitized, bytes)?;

        let table = match load_with(bytes, &self.config.load_options) {
            Ok(table) => table,
            Err(e) => {
                warn!("Upload '{}' could not be parsed: {}", original_filename, e);
                self.store.delete(&key)?;
                return Err(e.into());
            }
        };

        info!(
            "Stored upload '{}' as '{}' ({} rows x {} columns)",
            original_filename,
            key,
            table.row_count(),
            table.column_count()
        );

        Ok(UploadResponse {
            status: STATUS_SUCCESS.to_string(),
            message: "File uploaded successfully".to_string(),
            file_info: FileInfo {
                filename: key,
                original_filename: original_filename.to_string(),
                rows: table.row_count(),
                columns: table.column_count(),
                column_names: table.column_names(),
                file_size: size,
            },
        })
    }

    /// Store `bytes` under the first free upload key for `timestamp`.
    fn store_new_upload(&self, timestamp: i64, sanitized: &str, bytes: &[u8]) -> Result<String> {
        for attempt in 0..MAX_KEY_ATTEMPTS {
            let key = naming::upload_key(timestamp, attempt, sanitized);
            if self.store.put_new(&key, bytes)? {
                return Ok(key);
            }
            debug!("Upload key '{}' is taken", key);
        }

        Err(StoreError::Io(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("no free upload key for '{sanitized}' at {timestamp}"),
        ))
        .into())
    }

    /// Impute the upload stored under `key` and store the result under
    /// `processed_{key}`.
    pub fn process(&self, key: &str) -> Result<ProcessResponse> {
        let bytes = self
            .store
            .get(key)?
            .ok_or_else(|| ImputeError::InputNotFound(key.to_string()))?;

        let original = load_with(&bytes, &self.config.load_options)?;
        let imputation = MeanImputer::impute(&original)?;

        let processed_key = naming::processed_key(key);
        let output = write_csv(&imputation.processed)?;
        self.store.put(&processed_key, &output)?;

        let preview =
            MeanImputer::preview(&original, &imputation.processed, self.config.preview_rows)?;

        info!(
            "Processed '{}' into '{}': {} imputations across {} numeric columns",
            key,
            processed_key,
            imputation.report.total_imputations,
            imputation.report.numeric_column_count
        );

        let numeric_columns = imputation.report.numeric_columns.clone();
        Ok(ProcessResponse {
            status: STATUS_SUCCESS.to_string(),
            message: "File processed successfully".to_string(),
            stats: imputation.report,
            preview_data: preview.rows,
            imputation_flags: preview.imputation_flags,
            processed_filename: processed_key,
            numeric_columns,
        })
    }

    /// Fetch a processed artifact.
    pub fn download(&self, processed_key: &str) -> Result<Download> {
        let bytes = self
            .store
            .get(processed_key)?
            .ok_or_else(|| ImputeError::ArtifactNotFound(processed_key.to_string()))?;

        debug!("Serving '{}' ({} bytes)", processed_key, bytes.len());

        Ok(Download {
            filename: processed_key.to_string(),
            download_name: naming::download_name(processed_key),
            bytes,
        })
    }

    /// Remove the given keys. Missing keys and keys that are not valid
    /// artifact names are skipped.
    pub fn cleanup<S: AsRef<str>>(&self, keys: &[S]) -> Result<CleanupResponse> {
        let mut cleaned_files = Vec::new();

        for key in keys {
            let key = key.as_ref();
            match self.store.delete(key) {
                Ok(true) => {
                    debug!("Removed '{}'", key);
                    cleaned_files.push(key.to_string());
                }
                Ok(false) => {}
                Err(StoreError::InvalidKey(_)) => {
                    warn!("Skipping invalid artifact name '{}'", key);
                }
                Err(e) => return Err(e.into()),
            }
        }

        info!("Cleaned up {} of {} files", cleaned_files.len(), keys.len());

        Ok(CleanupResponse {
            status: STATUS_SUCCESS.to_string(),
            message: format!("Cleaned up {} files", cleaned_files.len()),
            cleaned_files,
        })
    }
}
