//! Service error types.
//!
//! Wraps engine and storage failures together with the request validation
//! errors raised before the engine is involved.

use crate::store::StoreError;
use impute_engine::ImputeError;
use serde::Serialize;

/// Errors returned by [`ImputationService`](crate::ImputationService).
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// No filename was supplied with the upload.
    #[error("No file selected")]
    MissingFilename,

    /// The uploaded file does not carry the accepted extension.
    #[error("Unsupported file type: '{0}'")]
    UnsupportedFileType(String),

    /// Upload exceeds the configured size cap.
    #[error("Payload too large: {size} bytes (limit {limit})")]
    PayloadTooLarge { size: u64, limit: u64 },

    #[error(transparent)]
    Engine(#[from] ImputeError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// Stable machine-readable code.
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::MissingFilename => "MISSING_FILENAME",
            ServiceError::UnsupportedFileType(_) => "UNSUPPORTED_FILE_TYPE",
            ServiceError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            ServiceError::Engine(e) => e.error_code(),
            ServiceError::Store(StoreError::InvalidKey(_)) => "INVALID_KEY",
            ServiceError::Store(StoreError::Io(_)) => "STORAGE_ERROR",
        }
    }

    /// Message safe to show to a client.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::MissingFilename => "No file selected".to_string(),
            ServiceError::UnsupportedFileType(_) => {
                "Invalid file type. Please upload a CSV file".to_string()
            }
            ServiceError::PayloadTooLarge { limit, .. } => {
                format!("File too large. Maximum size is {limit} bytes")
            }
            ServiceError::Engine(e) => e.user_message(),
            ServiceError::Store(StoreError::InvalidKey(key)) => {
                format!("Invalid file name: '{key}'")
            }
            ServiceError::Store(StoreError::Io(_)) => "Internal error".to_string(),
        }
    }

    /// Whether the caller is at fault (as opposed to the server).
    pub fn is_client_error(&self) -> bool {
        match self {
            ServiceError::MissingFilename
            | ServiceError::UnsupportedFileType(_)
            | ServiceError::PayloadTooLarge { .. }
            | ServiceError::Store(StoreError::InvalidKey(_)) => true,
            ServiceError::Engine(e) => e.is_client_error(),
            ServiceError::Store(StoreError::Io(_)) => false,
        }
    }
}

impl Serialize for ServiceError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("ServiceError", 2)?;
        state.serialize_field("code", self.error_code())?;
        state.serialize_field("message", &self.user_message())?;
        state.end()
    }
}

/// Result type alias for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_error_codes() {
        assert_eq!(ServiceError::MissingFilename.error_code(), "MISSING_FILENAME");
        assert_eq!(
            ServiceError::UnsupportedFileType("a.txt".into()).error_code(),
            "UNSUPPORTED_FILE_TYPE"
        );
        assert_eq!(
            ServiceError::PayloadTooLarge { size: 2, limit: 1 }.error_code(),
            "PAYLOAD_TOO_LARGE"
        );
        assert_eq!(
            ServiceError::from(ImputeError::NoNumericData).error_code(),
            "NO_NUMERIC_DATA"
        );
    }

    #[test]
    fn test_engine_errors_delegate() {
        let err = ServiceError::from(ImputeError::InputNotFound("x.csv".into()));
        assert_eq!(err.user_message(), "File not found");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_serialize_shape() {
        let err = ServiceError::UnsupportedFileType("notes.txt".into());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "code": "UNSUPPORTED_FILE_TYPE",
                "message": "Invalid file type. Please upload a CSV file"
            })
        );
    }

    #[test]
    fn test_io_error_hides_detail() {
        let io = std::io::Error::other("disk on fire");
        let err = ServiceError::from(StoreError::from(io));
        assert_eq!(err.user_message(), "Internal error");
        assert!(!err.is_client_error());
    }
}
