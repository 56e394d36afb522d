//! Error types for htmdec-ingest
//!
//! Configuration errors are raised before any store mutation; everything
//! else propagates out of the walk and aborts the import.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;

/// Import engine error type
#[derive(Debug, Error)]
pub enum ImportError {
    /// Data type other than `sem` / `pdv`
    #[error("Unknown data type: {0}")]
    UnknownDataType(String),

    /// Destination is not a folder
    #[error("{0} data can only be imported to folders")]
    InvalidDestination(String),

    /// Import path does not exist
    #[error("Not found: {0}")]
    PathNotFound(PathBuf),

    /// Import path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Include/exclude pattern failed to compile
    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Directory listing failed
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Store or adapter failure
    #[error(transparent)]
    Store(#[from] htmdec_common::Error),
}

impl ImportError {
    /// True for errors raised while validating the request
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ImportError::UnknownDataType(_)
                | ImportError::InvalidDestination(_)
                | ImportError::PathNotFound(_)
                | ImportError::NotADirectory(_)
                | ImportError::Pattern(_)
        )
    }
}

pub type ImportResult<T> = Result<T, ImportError>;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("Common error: {0}")]
    Common(#[from] htmdec_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Import(ref err) if err.is_validation() => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
            }
            ApiError::Import(ImportError::Store(htmdec_common::Error::NotFound(msg)))
            | ApiError::Common(htmdec_common::Error::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", msg)
            }
            ApiError::Common(htmdec_common::Error::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg)
            }
            ApiError::Import(ref err) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "IMPORT_ERROR", err.to_string())
            }
            ApiError::Common(ref err) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "COMMON_ERROR", err.to_string())
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_map_to_bad_request() {
        let err = ApiError::from(ImportError::NotADirectory(PathBuf::from("/etc/hosts")));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_missing_store_resource_maps_to_not_found() {
        let err = ApiError::from(ImportError::Store(htmdec_common::Error::NotFound(
            "folder".to_string(),
        )));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_io_failure_is_internal() {
        let err = ImportError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert!(!err.is_validation());
        assert_eq!(
            ApiError::from(err).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
