//! # Error Types
//!
//! Domain-specific error types for doughtrack-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                 │
//! │                                                                     │
//! │  doughtrack-core errors (this file)                                 │
//! │  ├── CoreError        - Domain rule violations                      │
//! │  └── ValidationError  - Malformed input (ALL failing fields)        │
//! │                                                                     │
//! │  doughtrack-db errors (separate crate)                              │
//! │  └── DbError          - Storage outcomes + infrastructure failures  │
//! │                                                                     │
//! │  doughtrack-api errors                                              │
//! │  └── ApiError         - What collaborators see (serialized)         │
//! │                                                                     │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → caller    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (item id, amounts, field names)
//! 3. Errors are enum variants, never String
//! 4. Expected outcomes (Forbidden, InsufficientStock) are values, not
//!    panics - callers branch on them

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Domain rule violations.
///
/// All of these are expected, user-facing outcomes: the caller corrects the
/// request (or gives up), nothing is retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// The requesting principal is not the item's owner.
    ///
    /// Produced by the single ownership guard ([`crate::ensure_owner`]);
    /// no mutation path checks ownership anywhere else.
    #[error("forbidden: item {item_id} belongs to another principal")]
    Forbidden { item_id: String },

    /// A `remove` adjustment would drive quantity below zero.
    ///
    /// ## User Workflow
    /// ```text
    /// remove 10 from an item holding 6
    ///      │
    ///      ▼
    /// InsufficientStock { available: 6.0, requested: 10.0 }
    ///      │
    ///      ▼
    /// UI shows: "Cannot remove more than current stock"
    /// ```
    #[error("insufficient stock: available {available}, requested {requested}")]
    InsufficientStock { available: f64, requested: f64 },

    /// Validation error (wraps ValidationError).
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Validation Error
// =============================================================================

/// One rejected field and why it was rejected.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FieldIssue {
    /// Wire name of the offending field (e.g. `reorderThreshold`).
    pub field: String,

    /// Human-readable reason.
    pub message: String,
}

impl FieldIssue {
    /// Creates an issue for a field.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        FieldIssue {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Input validation failure.
///
/// Carries **every** failing field, not just the first, so a caller gets a
/// single well-formed response covering the whole payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", format_issues(issues))]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    /// Creates a validation error from collected issues.
    ///
    /// Callers must guarantee `issues` is non-empty; an empty issue list
    /// means validation succeeded and no error should exist.
    pub fn new(issues: Vec<FieldIssue>) -> Self {
        debug_assert!(!issues.is_empty());
        ValidationError { issues }
    }
}

fn format_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("{}: {}", i.field, i.message))
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_carry_context() {
        let err = CoreError::InsufficientStock {
            available: 6.0,
            requested: 10.0,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock: available 6, requested 10"
        );

        let err = CoreError::Forbidden {
            item_id: "abc".to_string(),
        };
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn validation_error_lists_every_issue() {
        let err = ValidationError::new(vec![
            FieldIssue::new("name", "Item name is required"),
            FieldIssue::new("quantity", "Quantity cannot be negative"),
        ]);
        assert_eq!(
            err.to_string(),
            "name: Item name is required; quantity: Quantity cannot be negative"
        );
    }

    #[test]
    fn validation_converts_to_core_error() {
        let err = ValidationError::new(vec![FieldIssue::new("unit", "Invalid unit")]);
        let core: CoreError = err.into();
        assert!(matches!(core, CoreError::Validation(_)));
    }
}
