//! Error types for Postmask.

use thiserror::Error;

/// Common error type for Postmask.
#[derive(Error, Debug)]
pub enum PostmaskError {
    /// Database error.
    ///
    /// This is a generic database error that wraps errors from the storage
    /// backend. Errors from rusqlite are automatically converted.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation error for user input (alias names, roles, payloads).
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    ///
    /// Also returned when a caller has no relation to an alias, so that
    /// unauthorized lookups cannot probe for alias existence.
    #[error("{0} not found")]
    NotFound(String),

    /// Permission denied (owner-only action, viewer trying to send, ...).
    #[error("permission denied: {0}")]
    Permission(String),

    /// Authentication error (missing or invalid credential).
    #[error("authentication error: {0}")]
    Auth(String),

    /// Per-plan alias quota exhausted.
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Action requires a paid plan.
    #[error("plan upgrade required: {0}")]
    PlanRequired(String),

    /// Conflict with existing state (duplicate alias, duplicate collaborator).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Mail relay call failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

// Conversion from rusqlite errors
impl From<rusqlite::Error> for PostmaskError {
    fn from(e: rusqlite::Error) -> Self {
        PostmaskError::Database(e.to_string())
    }
}

/// Result type alias for Postmask operations.
pub type Result<T> = std::result::Result<T, PostmaskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = PostmaskError::Validation("alias name too long".to_string());
        assert_eq!(err.to_string(), "validation error: alias name too long");
    }

    #[test]
    fn test_not_found_error_display() {
        let err = PostmaskError::NotFound("alias".to_string());
        assert_eq!(err.to_string(), "alias not found");
    }

    #[test]
    fn test_permission_error_display() {
        let err = PostmaskError::Permission("owner access required".to_string());
        assert_eq!(err.to_string(), "permission denied: owner access required");
    }

    #[test]
    fn test_quota_error_display() {
        let err = PostmaskError::QuotaExceeded("free plan allows 5 aliases".to_string());
        assert_eq!(
            err.to_string(),
            "quota exceeded: free plan allows 5 aliases"
        );
    }

    #[test]
    fn test_conflict_error_display() {
        let err = PostmaskError::Conflict("alias address already taken".to_string());
        assert_eq!(err.to_string(), "conflict: alias address already taken");
    }

    #[test]
    fn test_transport_error_display() {
        let err = PostmaskError::Transport("relay returned 502".to_string());
        assert_eq!(err.to_string(), "transport error: relay returned 502");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PostmaskError = io_err.into();
        assert!(matches!(err, PostmaskError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_result_alias() {
        fn sample_ok() -> Result<i32> {
            Ok(42)
        }

        fn sample_err() -> Result<i32> {
            Err(PostmaskError::Auth("test".to_string()))
        }

        assert_eq!(sample_ok().unwrap(), 42);
        assert!(sample_err().is_err());
    }
}
