//! CSV Imputation Service
//!
//! The upload → process → download → cleanup workflow around
//! [`impute_engine`], with artifacts kept in an injectable
//! [`ArtifactStore`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use impute_service::{ImputationService, ServiceConfig};
//!
//! let service = ImputationService::open(ServiceConfig::builder().build()?)?;
//!
//! let upload = service.upload("ages.csv", &std::fs::read("ages.csv")?)?;
//! let processed = service.process(&upload.file_info.filename)?;
//! let download = service.download(&processed.processed_filename)?;
//!
//! std::fs::write(&download.download_name, &download.bytes)?;
//! service.cleanup(&[upload.file_info.filename, processed.processed_filename])?;
//! ```

pub mod config;
pub mod error;
pub mod naming;
pub mod service;
pub mod store;

// Re-exports for convenient access
pub use config::{ConfigValidationError, ServiceConfig, ServiceConfigBuilder};
pub use error::{Result as ServiceResult, ServiceError};
pub use service::{
    CleanupResponse, Download, FileInfo, HealthStatus, ImputationService, ProcessResponse,
    UploadResponse,
};
pub use store::{ArtifactStore, FsArtifactStore, MemoryArtifactStore, StoreError};
