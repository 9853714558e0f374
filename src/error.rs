//! Error types for filevault.

use thiserror::Error;

/// Common error type for filevault.
#[derive(Error, Debug)]
pub enum VaultError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The caller could not be resolved to a user.
    #[error("unauthorized")]
    Unauthorized,

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found (or not visible to the caller).
    #[error("{0} not found")]
    NotFound(String),

    /// Operation is not valid for the addressed resource.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Content could not be written to the blob store.
    #[error("storage error: {0}")]
    Storage(String),

    /// Thumbnail job could not be queued.
    #[error("queue error: {0}")]
    Queue(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for VaultError {
    fn from(e: sqlx::Error) -> Self {
        VaultError::Database(e.to_string())
    }
}

/// Result type alias for filevault operations.
pub type Result<T> = std::result::Result<T, VaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_display() {
        assert_eq!(VaultError::Unauthorized.to_string(), "unauthorized");
    }

    #[test]
    fn test_validation_error_display() {
        let err = VaultError::Validation("Missing name".to_string());
        assert_eq!(err.to_string(), "validation error: Missing name");
    }

    #[test]
    fn test_not_found_error_display() {
        let err = VaultError::NotFound("entry".to_string());
        assert_eq!(err.to_string(), "entry not found");
    }

    #[test]
    fn test_invalid_operation_display() {
        let err = VaultError::InvalidOperation("A folder doesn't have a content".to_string());
        assert_eq!(
            err.to_string(),
            "invalid operation: A folder doesn't have a content"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: VaultError = io_err.into();
        assert!(matches!(err, VaultError::Io(_)));
        assert!(err.to_string().contains("read-only"));
    }

    #[test]
    fn test_sqlx_error_conversion() {
        let err: VaultError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, VaultError::Database(_)));
    }
}
