//! # API Error Types
//!
//! The single error shape every command returns.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                │
//! │                                                                     │
//! │  CoreError / ValidationError (doughtrack-core)                      │
//! │       │                                                             │
//! │  DbError (doughtrack-db)                                            │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  ApiError (this module)                                             │
//! │   { code: MACHINE_READABLE, message: human readable,                │
//! │     details: per-field issues (validation only) }                   │
//! │                                                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `code` is the contract: callers branch on it, never on message text.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use doughtrack_core::{FieldIssue, ValidationError};
use doughtrack_db::DbError;

/// Machine-readable error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The referenced item does not exist (or no longer exists).
    NotFound,

    /// The requesting principal does not own the item.
    Forbidden,

    /// The request payload failed validation; see `details`.
    ValidationError,

    /// A stock removal would drive quantity below zero.
    InsufficientStock,

    /// The storage layer is unavailable or timed out; safe to retry.
    StorageUnavailable,

    /// Unexpected internal failure.
    Internal,
}

impl ErrorCode {
    /// The SCREAMING_SNAKE_CASE wire name of this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::InsufficientStock => "INSUFFICIENT_STOCK",
            ErrorCode::StorageUnavailable => "STORAGE_UNAVAILABLE",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Unified command error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("{}: {message}", code.as_str())]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable category.
    pub code: ErrorCode,

    /// Human-readable description.
    pub message: String,

    /// Per-field issues. Present only for `VALIDATION_ERROR`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldIssue>>,
}

impl ApiError {
    /// Creates an error with no field details.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Creates a validation error from field issues.
    pub fn validation(issues: Vec<FieldIssue>) -> Self {
        ApiError {
            code: ErrorCode::ValidationError,
            message: "Validation failed".to_string(),
            details: Some(issues),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.issues)
    }
}

/// Storage-boundary errors map onto the wire taxonomy.
///
/// ## Error Mapping
/// ```text
/// NotFound                            → NOT_FOUND
/// Forbidden                           → FORBIDDEN
/// InsufficientStock                   → INSUFFICIENT_STOCK
/// is_transient() (busy/pool timeout,  → STORAGE_UNAVAILABLE (retryable)
///   connection, query, transaction)
/// Migration | Internal                → INTERNAL
/// ```
///
/// The transient set is `DbError::is_transient()` itself, so the storage
/// layer's retryability classification and the wire code cannot drift
/// apart.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        let code = match &err {
            DbError::NotFound { .. } => ErrorCode::NotFound,
            DbError::Forbidden { .. } => ErrorCode::Forbidden,
            DbError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            _ if err.is_transient() => ErrorCode::StorageUnavailable,
            _ => ErrorCode::Internal,
        };
        ApiError::new(code, err.to_string())
    }
}

/// Result type for command methods.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Unit Tests
// =============================================================================
