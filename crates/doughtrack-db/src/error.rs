//! # Database Error Types
//!
//! Error types for storage operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                │
//! │                                                                     │
//! │  SQLite Error (sqlx::Error)                                         │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  DbError (this module) ← Adds context and categorization            │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  ApiError (doughtrack-api) ← Serialized for the caller              │
//! │                                                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Domain outcomes vs infrastructure failures
//! NotFound, Forbidden and InsufficientStock live here - not only in core -
//! because the invariants behind them are enforced inside the repository
//! transaction, which is the only place that can decide them atomically.
//! Everything else is an infrastructure failure; the bounded-timeout
//! variants are retryable and classified by [`DbError::is_transient`].

use thiserror::Error;

use doughtrack_core::CoreError;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found.
    ///
    /// ## When This Occurs
    /// - Item id doesn't exist (never existed, or was deleted)
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The requesting principal does not own the item.
    ///
    /// No state change and no audit entry is produced.
    #[error("forbidden: item {item_id} belongs to another principal")]
    Forbidden { item_id: String },

    /// A `remove` adjustment would drive quantity below zero.
    ///
    /// The transaction rolls back: no write, no audit entry.
    #[error("insufficient stock for item {item_id}: available {available}, requested {requested}")]
    InsufficientStock {
        item_id: String,
        available: f64,
        requested: f64,
    },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed (begin/commit/rollback).
    #[error("transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use past the acquire timeout).
    #[error("connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Whether this error is a transient infrastructure failure the caller
    /// may retry, as opposed to a definitive domain outcome.
    ///
    /// Every storage operation is bounded by the pool acquire timeout and
    /// the SQLite busy timeout; expiry of either lands here. `Internal` and
    /// `MigrationFailed` are excluded - retrying those cannot help.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DbError::ConnectionFailed(_)
                | DbError::QueryFailed(_)
                | DbError::TransactionFailed(_)
                | DbError::PoolExhausted
        )
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → QueryFailed (constraint text preserved)
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => DbError::QueryFailed(db_err.message().to_string()),

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Domain rule violations surface unchanged through the storage boundary.
impl From<CoreError> for DbError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Forbidden { item_id } => DbError::Forbidden { item_id },
            CoreError::InsufficientStock {
                available,
                requested,
            } => DbError::InsufficientStock {
                item_id: String::new(),
                available,
                requested,
            },
            // Validation runs before the storage layer; reaching here is a bug.
            CoreError::Validation(e) => DbError::Internal(e.to_string()),
        }
    }
}

/// Result type for storage operations.
pub type DbResult<T> = Result<T, DbError>;
