//! # Validation Module
//!
//! Payload validation for DoughTrack commands.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                              │
//! │                                                                     │
//! │  Layer 1: Presentation (external collaborator)                      │
//! │  ├── Basic format checks, immediate user feedback                   │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 2: THIS MODULE                                               │
//! │  ├── Closed-enum membership, ranges, numeric coercion               │
//! │  └── Collects EVERY failing field into one ValidationError          │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 3: Database (SQLite)                                         │
//! │  ├── CHECK (quantity >= 0) and enum CHECK constraints               │
//! │  └── Backstop only - never the first line of defense                │
//! │                                                                     │
//! │  Defense in depth: multiple layers catch different errors           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Coercion
//! Numeric fields accept a JSON number **or** a numeric string
//! (`"12.5"`); strings are trimmed and parsed, and anything non-finite or
//! non-numeric is rejected. This matches what form-driven callers have
//! always been allowed to send.

use serde::{Deserialize, Serialize};

use crate::error::{FieldIssue, ValidationError};
use crate::types::{AdjustAction, Category, Unit};
use crate::MAX_NAME_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Payloads (pre-validation shapes)
// =============================================================================

/// A numeric field as submitted: either a number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl From<f64> for NumericInput {
    fn from(n: f64) -> Self {
        NumericInput::Number(n)
    }
}

impl From<&str> for NumericInput {
    fn from(s: &str) -> Self {
        NumericInput::Text(s.to_string())
    }
}

/// Raw item fields as submitted by a caller.
///
/// Category and unit arrive as strings so that a bad value surfaces as a
/// field issue next to the others instead of a deserialization failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPayload {
    pub name: String,
    pub category: String,
    pub unit: String,
    pub quantity: NumericInput,
    pub reorder_threshold: NumericInput,
    pub cost_price: NumericInput,
}

/// Raw stock adjustment as submitted by a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentPayload {
    pub action: String,
    pub amount: NumericInput,
}

// =============================================================================
// Validated shapes
// =============================================================================

/// Item fields that passed validation: trimmed name, members of the closed
/// enumerations, finite non-negative numerics.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidItem {
    pub name: String,
    pub category: Category,
    pub unit: Unit,
    pub quantity: f64,
    pub reorder_threshold: f64,
    pub cost_price: f64,
}

/// A stock adjustment that passed validation: known direction, strictly
/// positive finite amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidAdjustment {
    pub action: AdjustAction,
    pub amount: f64,
}

// =============================================================================
// Validators
// =============================================================================

/// Validates raw item fields.
///
/// Returns a [`ValidationError`] enumerating **every** failing field.
///
/// ## Rules
/// - `name`: non-empty after trimming, at most 100 characters
/// - `category` / `unit`: members of their closed enumerations
/// - `quantity`, `reorderThreshold`, `costPrice`: finite, non-negative,
///   numeric strings coerced
pub fn validate_item(payload: &ItemPayload) -> ValidationResult<ValidItem> {
    let mut issues = Vec::new();

    let name = payload.name.trim().to_string();
    if name.is_empty() {
        issues.push(FieldIssue::new("name", "Item name is required"));
    } else if name.chars().count() > MAX_NAME_LEN {
        issues.push(FieldIssue::new(
            "name",
            "Item name cannot exceed 100 characters",
        ));
    }

    let category = match payload.category.parse::<Category>() {
        Ok(c) => Some(c),
        Err(()) => {
            issues.push(FieldIssue::new("category", "Invalid category"));
            None
        }
    };

    let unit = match payload.unit.parse::<Unit>() {
        Ok(u) => Some(u),
        Err(()) => {
            issues.push(FieldIssue::new("unit", "Invalid unit"));
            None
        }
    };

    let quantity = non_negative_number(&payload.quantity, "quantity", "Quantity", &mut issues);
    let reorder_threshold = non_negative_number(
        &payload.reorder_threshold,
        "reorderThreshold",
        "Reorder threshold",
        &mut issues,
    );
    let cost_price =
        non_negative_number(&payload.cost_price, "costPrice", "Cost price", &mut issues);

    if !issues.is_empty() {
        return Err(ValidationError::new(issues));
    }

    // All Options are Some here: a None always pushes an issue above.
    Ok(ValidItem {
        name,
        category: category.ok_or_else(invalid_state)?,
        unit: unit.ok_or_else(invalid_state)?,
        quantity: quantity.ok_or_else(invalid_state)?,
        reorder_threshold: reorder_threshold.ok_or_else(invalid_state)?,
        cost_price: cost_price.ok_or_else(invalid_state)?,
    })
}

/// Validates a raw stock adjustment.
///
/// ## Rules
/// - `action`: exactly `"add"` or `"remove"`
/// - `amount`: strictly positive, finite, numeric strings coerced
pub fn validate_adjustment(payload: &AdjustmentPayload) -> ValidationResult<ValidAdjustment> {
    let mut issues = Vec::new();

    let action = match payload.action.as_str() {
        "add" => Some(AdjustAction::Add),
        "remove" => Some(AdjustAction::Remove),
        _ => {
            issues.push(FieldIssue::new(
                "action",
                "Action must be either \"add\" or \"remove\"",
            ));
            None
        }
    };

    let amount = match coerce_number(&payload.amount) {
        Some(n) if n > 0.0 => Some(n),
        Some(_) => {
            issues.push(FieldIssue::new("amount", "Amount must be positive"));
            None
        }
        None => {
            issues.push(FieldIssue::new(
                "amount",
                "Amount must be a valid positive number",
            ));
            None
        }
    };

    if !issues.is_empty() {
        return Err(ValidationError::new(issues));
    }

    Ok(ValidAdjustment {
        action: action.ok_or_else(invalid_state)?,
        amount: amount.ok_or_else(invalid_state)?,
    })
}

// =============================================================================
// Helpers
// =============================================================================

/// Coerces a submitted numeric field to a finite f64, or `None`.
fn coerce_number(input: &NumericInput) -> Option<f64> {
    let value = match input {
        NumericInput::Number(n) => *n,
        NumericInput::Text(s) => s.trim().parse::<f64>().ok()?,
    };
    value.is_finite().then_some(value)
}

/// Validates one non-negative numeric field, pushing an issue on failure.
fn non_negative_number(
    input: &NumericInput,
    field: &str,
    label: &str,
    issues: &mut Vec<FieldIssue>,
) -> Option<f64> {
    match coerce_number(input) {
        Some(n) if n >= 0.0 => Some(n),
        Some(_) => {
            issues.push(FieldIssue::new(
                field,
                format!("{label} cannot be negative"),
            ));
            None
        }
        None => {
            issues.push(FieldIssue::new(
                field,
                format!("{label} must be a valid non-negative number"),
            ));
            None
        }
    }
}

/// Unreachable when `issues` was empty; keeps the success path panic-free.
fn invalid_state() -> ValidationError {
    ValidationError::new(vec![FieldIssue::new("payload", "invalid payload")])
}

// =============================================================================
// Unit Tests
// =============================================================================
