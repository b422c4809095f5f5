//! Configuration types for the imputation service.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic service setup.

use impute_engine::CsvLoadOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default upload cap: 16 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;

/// Default number of rows returned in a processing preview.
pub const DEFAULT_PREVIEW_ROWS: usize = 50;

/// Only this file extension is accepted on upload by default.
pub const DEFAULT_ALLOWED_EXTENSION: &str = "csv";

/// Environment variable overriding the default storage directory.
pub const STORAGE_DIR_ENV: &str = "CSV_IMPUTER_STORAGE_DIR";

/// Default directory for stored artifacts.
///
/// Uses `CSV_IMPUTER_STORAGE_DIR` when set, otherwise a `csv-imputer`
/// directory under the system temp dir.
pub fn default_storage_dir() -> PathBuf {
    std::env::var_os(STORAGE_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("csv-imputer"))
}

/// Configuration for the imputation service.
///
/// Use [`ServiceConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use impute_service::ServiceConfig;
///
/// let config = ServiceConfig::builder()
///     .storage_dir("/var/lib/csv-imputer")
///     .preview_rows(20)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Directory holding uploaded and processed artifacts.
    /// Default: see [`default_storage_dir`]
    pub storage_dir: PathBuf,

    /// Largest accepted upload in bytes.
    /// Default: 16 MiB
    pub max_upload_bytes: u64,

    /// Rows included in the processing preview.
    /// Default: 50
    pub preview_rows: usize,

    /// Accepted file extension, compared case-insensitively.
    /// Default: "csv"
    pub allowed_extension: String,

    /// How uploaded bytes are parsed.
    pub load_options: CsvLoadOptions,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            preview_rows: DEFAULT_PREVIEW_ROWS,
            allowed_extension: DEFAULT_ALLOWED_EXTENSION.to_string(),
            load_options: CsvLoadOptions::default(),
        }
    }
}

impl ServiceConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.max_upload_bytes == 0 {
            return Err(ConfigValidationError::InvalidUploadLimit(
                self.max_upload_bytes,
            ));
        }

        if self.preview_rows == 0 {
            return Err(ConfigValidationError::InvalidPreviewRows(self.preview_rows));
        }

        if self.allowed_extension.trim().is_empty() {
            return Err(ConfigValidationError::EmptyExtension);
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid upload limit: {0} bytes (must be at least 1)")]
    InvalidUploadLimit(u64),

    #[error("Invalid preview rows: {0} (must be at least 1)")]
    InvalidPreviewRows(usize),

    #[error("Allowed file extension must not be empty")]
    EmptyExtension,
}

/// Builder for [`ServiceConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct ServiceConfigBuilder {
    storage_dir: Option<PathBuf>,
    max_upload_bytes: Option<u64>,
    preview_rows: Option<usize>,
    allowed_extension: Option<String>,
    load_options: Option<CsvLoadOptions>,
}

impl ServiceConfigBuilder {
    /// Set the artifact storage directory.
    pub fn storage_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_dir = Some(path.into());
        self
    }

    /// Set the upload size cap in bytes.
    pub fn max_upload_bytes(mut self, bytes: u64) -> Self {
        self.max_upload_bytes = Some(bytes);
        self
    }

    /// Set the number of preview rows returned by `process`.
    pub fn preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = Some(rows);
        self
    }

    /// Set the accepted upload file extension (without the dot).
    pub fn allowed_extension(mut self, extension: impl Into<String>) -> Self {
        self.allowed_extension = Some(extension.into());
        self
    }

    /// Set the CSV parsing options.
    pub fn load_options(mut self, options: CsvLoadOptions) -> Self {
        self.load_options = Some(options);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `ServiceConfig` or an error if validation fails.
    pub fn build(self) -> Result<ServiceConfig, ConfigValidationError> {
        let config = ServiceConfig {
            storage_dir: self.storage_dir.unwrap_or_else(default_storage_dir),
            max_upload_bytes: self.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            preview_rows: self.preview_rows.unwrap_or(DEFAULT_PREVIEW_ROWS),
            allowed_extension: self
                .allowed_extension
                .unwrap_or_else(|| DEFAULT_ALLOWED_EXTENSION.to_string()),
            load_options: self.load_options.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServiceConfig::default();
        assert_eq!(config.max_upload_bytes, 16 * 1024 * 1024);
        assert_eq!(config.preview_rows, 50);
        assert_eq!(config.allowed_extension, "csv");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = ServiceConfig::builder()
            .storage_dir("/tmp/imputer-test")
            .max_upload_bytes(1024)
            .preview_rows(5)
            .build()
            .unwrap();

        assert_eq!(config.storage_dir, PathBuf::from("/tmp/imputer-test"));
        assert_eq!(config.max_upload_bytes, 1024);
        assert_eq!(config.preview_rows, 5);
    }

    #[test]
    fn test_validation_zero_upload_limit() {
        let result = ServiceConfig::builder().max_upload_bytes(0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidUploadLimit(0)
        ));
    }

    #[test]
    fn test_validation_zero_preview_rows() {
        let result = ServiceConfig::builder().preview_rows(0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidPreviewRows(0)
        ));
    }

    #[test]
    fn test_validation_empty_extension() {
        let result = ServiceConfig::builder().allowed_extension(" ").build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::EmptyExtension
        ));
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "storage_dir": "artifacts",
            "max_upload_bytes": 2048,
            "preview_rows": 10,
            "allowed_extension": "csv",
            "load_options": { "null_tokens": ["?"], "infer_schema_length": 100 }
        }"#;

        let config: ServiceConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.storage_dir, PathBuf::from("artifacts"));
        assert_eq!(config.max_upload_bytes, 2048);
        assert_eq!(config.load_options.null_tokens, vec!["?".to_string()]);
        assert_eq!(config.load_options.infer_schema_length, Some(100));
    }
}
