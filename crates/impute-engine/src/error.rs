//! Error types for the imputation engine.
//!
//! This module provides the error hierarchy for loading tables and running
//! mean imputation, using `thiserror`.
//!
//! Errors are serializable so a transport layer can hand them to a client
//! as a `{code, message}` pair without exposing internal detail.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the imputation engine.
#[derive(Error, Debug)]
pub enum ImputeError {
    /// Referenced source identifier has no backing data.
    #[error("Input '{0}' not found")]
    InputNotFound(String),

    /// Raw bytes do not parse into a rectangular table.
    #[error("Failed to parse input as CSV: {0}")]
    UnparseableInput(String),

    /// The table parsed but has no numeric column eligible for imputation.
    #[error("No numeric columns found for imputation")]
    NoNumericData,

    /// A requested output identifier was never produced or was removed.
    #[error("Artifact '{0}' not found")]
    ArtifactNotFound(String),

    /// Table construction violated a structural invariant.
    #[error("Invalid table: {0}")]
    InvalidTable(String),

    /// Column was not found in the table.
    #[error("Column '{0}' not found in table")]
    ColumnNotFound(String),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ImputeError {
    /// Get error code for client handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InputNotFound(_) => "INPUT_NOT_FOUND",
            Self::UnparseableInput(_) => "UNPARSEABLE_INPUT",
            Self::NoNumericData => "NO_NUMERIC_DATA",
            Self::ArtifactNotFound(_) => "ARTIFACT_NOT_FOUND",
            Self::InvalidTable(_) => "INVALID_TABLE",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Io(_) => "IO_ERROR",
        }
    }

    /// Message suitable for an end user.
    ///
    /// Wrapped library errors collapse to a generic message; their detail
    /// stays in the `Display` output for logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::InputNotFound(_) | Self::ArtifactNotFound(_) => "File not found".to_string(),
            Self::UnparseableInput(reason) => format!("Invalid CSV file: {}", reason),
            Self::NoNumericData => "No numeric columns found for imputation".to_string(),
            Self::InvalidTable(_) => "Invalid table structure".to_string(),
            Self::ColumnNotFound(column) => format!("Column '{}' not found", column),
            Self::Polars(_) | Self::Io(_) => "Internal error".to_string(),
        }
    }

    /// Check if the error was caused by the caller's input rather than the engine.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Polars(_) | Self::Io(_))
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for ImputeError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ImputeError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.user_message())?;
        state.end()
    }
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, ImputeError>;
