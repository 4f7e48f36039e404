//! Error types for the reference database
//!
//! Provides:
//! - Distinct error types for different failure modes
//! - Error codes for programmatic handling
//!
//! Every error is a local, recoverable condition surfaced to the caller;
//! none leaves the database in an inconsistent state. Consistency checks
//! never error, they report through [`crate::db::ConsistencyReport`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::table::RecordId;

/// Result type alias using RefDbError
pub type Result<T> = std::result::Result<T, RefDbError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    ValidationError,
    InvalidAuthorName,
    InvalidYear,

    // Resource errors (4xxx)
    UnknownId,
    AuthorNotFound,

    // Conflict errors (5xxx)
    AlreadyIndexed,
    DuplicateRecord,

    // Citation errors (6xxx)
    InvalidCitation,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            // Validation (1xxx)
            ErrorCode::ValidationError => 1001,
            ErrorCode::InvalidAuthorName => 1002,
            ErrorCode::InvalidYear => 1003,

            // Resources (4xxx)
            ErrorCode::UnknownId => 4001,
            ErrorCode::AuthorNotFound => 4002,

            // Conflicts (5xxx)
            ErrorCode::AlreadyIndexed => 5001,
            ErrorCode::DuplicateRecord => 5002,

            // Citations (6xxx)
            ErrorCode::InvalidCitation => 6001,
        }
    }
}

/// Reference database error types
#[derive(Error, Debug)]
pub enum RefDbError {
    // Validation errors
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Invalid author name: {name:?}")]
    InvalidAuthorName { name: String },

    #[error("Invalid year of publication: {year} (allowed {min}..={max})")]
    InvalidYear { year: i32, min: i32, max: i32 },

    // Resource errors
    #[error("Unknown record id: {id}")]
    UnknownId { id: RecordId },

    #[error("Author not found: {name}")]
    AuthorNotFound { name: String },

    // Conflict errors
    #[error("Record already indexed under id {id}")]
    AlreadyIndexed { id: RecordId },

    #[error("Duplicate record: {title}")]
    DuplicateRecord { title: String },

    // Citation errors
    #[error("Invalid citation: {message}")]
    InvalidCitation { message: String },
}

impl RefDbError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            RefDbError::Validation { .. } => ErrorCode::ValidationError,
            RefDbError::InvalidAuthorName { .. } => ErrorCode::InvalidAuthorName,
            RefDbError::InvalidYear { .. } => ErrorCode::InvalidYear,
            RefDbError::UnknownId { .. } => ErrorCode::UnknownId,
            RefDbError::AuthorNotFound { .. } => ErrorCode::AuthorNotFound,
            RefDbError::AlreadyIndexed { .. } => ErrorCode::AlreadyIndexed,
            RefDbError::DuplicateRecord { .. } => ErrorCode::DuplicateRecord,
            RefDbError::InvalidCitation { .. } => ErrorCode::InvalidCitation,
        }
    }

    /// Check if this error comes from malformed caller input
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            RefDbError::Validation { .. }
                | RefDbError::InvalidAuthorName { .. }
                | RefDbError::InvalidYear { .. }
        )
    }

    /// Check if this error reports a conflict with already-stored data
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            RefDbError::AlreadyIndexed { .. } | RefDbError::DuplicateRecord { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        let err = RefDbError::UnknownId {
            id: RecordId::new(7),
        };
        assert_eq!(err.code(), ErrorCode::UnknownId);
        assert_eq!(err.code().as_code(), 4001);
        assert!(!err.is_validation());
    }

    #[test]
    fn test_validation_error() {
        let err = RefDbError::Validation {
            message: "title must not be blank".into(),
            field: Some("title".into()),
        };
        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert!(err.is_validation());
        assert!(!err.is_conflict());
    }

    #[test]
    fn test_conflict_errors() {
        let err = RefDbError::DuplicateRecord {
            title: "Apples and Oranges".into(),
        };
        assert!(err.is_conflict());
        assert_eq!(err.code().as_code(), 5002);
    }

    #[test]
    fn test_error_code_serialization() {
        let json = serde_json::to_string(&ErrorCode::DuplicateRecord).unwrap();
        assert_eq!(json, "\"DUPLICATE_RECORD\"");
    }
}
