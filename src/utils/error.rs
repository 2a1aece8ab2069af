//! Error types and handling
//!
//! Common error types used across the crate, plus the serializable
//! report form handed to a host UI.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Crate-wide error type
#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Recorder unavailable: {0}")]
    RecorderUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unexpected error: {0}")]
    Unknown(String),
}

/// Error surfaced to the UI as a `{kind, message}` pair.
///
/// The kind collapses internal IO/serialization failures into `Unknown`;
/// the UI taxonomy is only the four kinds a user can act on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub kind: String,
    pub message: String,
}

impl From<&RecorderError> for ErrorReport {
    fn from(error: &RecorderError) -> Self {
        let kind = match error {
            RecorderError::PermissionDenied(_) => "PermissionDenied",
            RecorderError::NotSupported(_) => "NotSupported",
            RecorderError::RecorderUnavailable(_) => "RecorderUnavailable",
            RecorderError::Io(_) | RecorderError::Serialization(_) | RecorderError::Unknown(_) => {
                "Unknown"
            }
        };

        ErrorReport {
            kind: kind.to_string(),
            message: error.to_string(),
        }
    }
}

impl From<RecorderError> for ErrorReport {
    fn from(error: RecorderError) -> Self {
        ErrorReport::from(&error)
    }
}

/// Result type alias using RecorderError
pub type RecorderResult<T> = Result<T, RecorderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_kind_mapping() {
        let report: ErrorReport =
            RecorderError::PermissionDenied("microphone access refused".to_string()).into();
        assert_eq!(report.kind, "PermissionDenied");
        assert!(report.message.contains("microphone access refused"));

        let io = RecorderError::Io(std::io::Error::other("disk gone"));
        assert_eq!(ErrorReport::from(&io).kind, "Unknown");
    }
}
