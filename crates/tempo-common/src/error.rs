//! Tempo Error - Unified Error Types
//!
//! Error handling for all Tempo operations. Categorizes failures into the
//! kinds the API boundary needs to distinguish (client mistakes, missing
//! entities, identity conflicts, storage outages) and provides utilities for
//! classification.
//!
//! Key Features:
//! - Domain-specific error variants for precise error handling
//! - User vs system error classification for response mapping
//! - Retryable error detection
//! - Seamless integration with std::io::Error
//!
//! @version 0.1.0
//! @author Tempo Development Team

use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Unified error type for all Tempo operations.
#[derive(Error, Debug)]
pub enum TempoError {
    /// Malformed input: missing required field, unparseable timestamp,
    /// non-positive limit, unsupported aggregation mode.
    #[error("validation error: {0}")]
    Validation(String),

    /// A series or data point identity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Identity collision on creation.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The storage collaborator cannot be reached.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Type Aliases
// =============================================================================

/// Result type alias for Tempo operations.
pub type Result<T> = std::result::Result<T, TempoError>;

// =============================================================================
// Error Classification
// =============================================================================

impl TempoError {
    /// Returns true if this is a user error (vs system error).
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            TempoError::Validation(_) | TempoError::NotFound(_) | TempoError::Conflict(_)
        )
    }

    /// Returns true if the operation can be safely retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TempoError::Unavailable(_) | TempoError::Io(_))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_error_classification() {
        assert!(TempoError::Validation("bad limit".into()).is_user_error());
        assert!(TempoError::NotFound("series".into()).is_user_error());
        assert!(TempoError::Conflict("id taken".into()).is_user_error());
        assert!(!TempoError::Unavailable("down".into()).is_user_error());
    }

    #[test]
    fn test_retryable_classification() {
        assert!(TempoError::Unavailable("down".into()).is_retryable());
        assert!(!TempoError::Validation("bad".into()).is_retryable());
        assert!(!TempoError::Conflict("dup".into()).is_retryable());
    }

    #[test]
    fn test_display() {
        let err = TempoError::NotFound("time series abc".into());
        assert_eq!(err.to_string(), "not found: time series abc");
    }
}
