//! # Stock Arithmetic
//!
//! The quantity-adjustment rule as a pure function.
//!
//! The persistence layer pushes the same rule down into a conditional
//! UPDATE so concurrent adjustments cannot race past it; this function is
//! the single in-process statement of the rule, used for pre-checks and
//! exercised directly by tests.

use crate::error::{CoreError, CoreResult};
use crate::types::AdjustAction;
use crate::validation::ValidAdjustment;

/// Computes the quantity after an adjustment.
///
/// ## Rules
/// - `add`: `current + amount`
/// - `remove`: `current - amount`, failing with
///   [`CoreError::InsufficientStock`] if the result would be negative -
///   in which case nothing may be written and no audit entry produced.
///
/// ## Example
/// ```rust
/// use doughtrack_core::{next_quantity, ValidAdjustment};
/// use doughtrack_core::types::AdjustAction;
///
/// let adj = ValidAdjustment { action: AdjustAction::Remove, amount: 4.0 };
/// assert_eq!(next_quantity(10.0, &adj).unwrap(), 6.0);
///
/// let adj = ValidAdjustment { action: AdjustAction::Remove, amount: 10.0 };
/// assert!(next_quantity(6.0, &adj).is_err());
/// ```
pub fn next_quantity(current: f64, adjustment: &ValidAdjustment) -> CoreResult<f64> {
    match adjustment.action {
        AdjustAction::Add => Ok(current + adjustment.amount),
        AdjustAction::Remove => {
            let next = current - adjustment.amount;
            if next < 0.0 {
                Err(CoreError::InsufficientStock {
                    available: current,
                    requested: adjustment.amount,
                })
            } else {
                Ok(next)
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn adj(action: AdjustAction, amount: f64) -> ValidAdjustment {
        ValidAdjustment { action, amount }
    }

    #[test]
    fn add_increases_quantity() {
        assert_eq!(next_quantity(0.0, &adj(AdjustAction::Add, 2.5)).unwrap(), 2.5);
        assert_eq!(next_quantity(10.0, &adj(AdjustAction::Add, 4.0)).unwrap(), 14.0);
    }

    #[test]
    fn remove_decreases_quantity() {
        assert_eq!(
            next_quantity(10.0, &adj(AdjustAction::Remove, 4.0)).unwrap(),
            6.0
        );
    }

    #[test]
    fn remove_to_exactly_zero_is_allowed() {
        assert_eq!(
            next_quantity(5.0, &adj(AdjustAction::Remove, 5.0)).unwrap(),
            0.0
        );
    }

    #[test]
    fn remove_past_zero_fails_with_amounts() {
        let err = next_quantity(6.0, &adj(AdjustAction::Remove, 10.0)).unwrap_err();
        assert_eq!(
            err,
            CoreError::InsufficientStock {
                available: 6.0,
                requested: 10.0
            }
        );
    }

    #[test]
    fn signed_sum_invariant_over_a_sequence() {
        let steps = [
            adj(AdjustAction::Add, 5.0),
            adj(AdjustAction::Remove, 2.0),
            adj(AdjustAction::Add, 1.5),
            adj(AdjustAction::Remove, 4.5),
        ];

        let mut quantity = 10.0;
        for step in &steps {
            let before = quantity;
            quantity = next_quantity(quantity, step).unwrap();
            let signed = match step.action {
                AdjustAction::Add => step.amount,
                AdjustAction::Remove => -step.amount,
            };
            assert_eq!(quantity, before + signed);
            assert!(quantity >= 0.0);
        }
        assert_eq!(quantity, 10.0);
    }
}
