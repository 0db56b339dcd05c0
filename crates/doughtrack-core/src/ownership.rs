//! # Ownership Guard
//!
//! The single authorization check for item mutations.
//!
//! Every mutation path (update, delete, stock adjustment) calls
//! [`ensure_owner`] before writing; no call site re-implements the
//! comparison. The audit log's `item_id` is a weak reference and is never
//! used to re-derive ownership after the fact - only the item row's
//! `owner_id` decides.

use crate::error::{CoreError, CoreResult};

/// Fails with [`CoreError::Forbidden`] unless `principal_id` is the item's
/// recorded owner.
///
/// ## Arguments
/// * `owner_id` - the `owner_id` recorded on the item at creation
/// * `principal_id` - the requesting principal
/// * `item_id` - the item, for error context only
pub fn ensure_owner(owner_id: &str, principal_id: &str, item_id: &str) -> CoreResult<()> {
    if owner_id == principal_id {
        Ok(())
    } else {
        Err(CoreError::Forbidden {
            item_id: item_id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_passes() {
        assert!(ensure_owner("user_1", "user_1", "item-1").is_ok());
    }

    #[test]
    fn foreign_principal_is_forbidden() {
        let err = ensure_owner("user_1", "user_2", "item-1").unwrap_err();
        assert_eq!(
            err,
            CoreError::Forbidden {
                item_id: "item-1".to_string()
            }
        );
    }
}
