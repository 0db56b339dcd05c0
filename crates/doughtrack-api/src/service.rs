//! # Inventory Command Surface
//!
//! One async method per command:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Inventory service                             │
//! │                                                                     │
//! │  create_item     ── validate ──► ItemRepository::create             │
//! │  list_items      ── parse query ──► ItemRepository::list_by_owner   │
//! │  update_item     ── validate ──► ItemRepository::update             │
//! │  delete_item     ──────────────► ItemRepository::delete             │
//! │  adjust_stock    ── validate ──► ItemRepository::adjust             │
//! │  list_audit_log  ── parse query ──► AuditRepository::list_by_actor  │
//! │                                                                     │
//! │  Every method: takes &Principal, returns ApiResult<_>               │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The service owns no state beyond a cloned [`Database`] handle and holds
//! no locks; all concurrency control lives in the storage layer.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use doughtrack_core::{
    validate_adjustment, validate_item, AdjustmentPayload, AuditAction, AuditFilter,
    AuditLogEntry, Category, FieldIssue, Item, ItemFilter, ItemPayload, ItemSort, Principal,
    SortDirection, SortField, DEFAULT_AUDIT_LIMIT, MAX_AUDIT_LIMIT,
};
use doughtrack_db::Database;

// =============================================================================
// Query / response DTOs
// =============================================================================

/// Item listing query. All fields optional; `category: "all"` means no
/// category filter (wire compatibility with existing clients).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListItemsQuery {
    /// Category name, or `"all"`.
    pub category: Option<String>,

    /// Case-insensitive substring match on the item name.
    pub name: Option<String>,

    /// Sort column: `name`, `category`, `quantity`, `createdAt`, `updatedAt`.
    pub sort_by: Option<String>,

    /// Sort direction: `asc` or `desc`.
    pub order: Option<String>,
}

/// Audit listing query. `action: "all"` means no action filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListAuditQuery {
    /// Action name, or `"all"`.
    pub action: Option<String>,

    /// Only entries about this item.
    pub item_id: Option<String>,

    /// Maximum entries returned. Defaults to 100, capped at 500.
    pub limit: Option<u32>,
}

/// Successful stock adjustment response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustStockResponse {
    /// The item after the adjustment.
    pub item: Item,

    /// Quantity before the adjustment.
    pub previous_quantity: f64,

    /// Quantity after the adjustment.
    pub new_quantity: f64,

    /// The applied amount.
    pub adjustment: f64,
}

/// Successful deletion response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteItemResponse {
    pub message: String,
}

// =============================================================================
// Service
// =============================================================================

/// The inventory command surface.
///
/// Cheap to clone; every method is safe to call concurrently.
#[derive(Debug, Clone)]
pub struct Inventory {
    db: Database,
}

impl Inventory {
    /// Creates the service over an initialized database handle.
    pub fn new(db: Database) -> Self {
        Inventory { db }
    }

    /// Creates a new item owned by `actor`.
    ///
    /// ## Errors
    /// * `VALIDATION_ERROR` - payload rejected; `details` lists every
    ///   failing field
    pub async fn create_item(&self, actor: &Principal, payload: &ItemPayload) -> ApiResult<Item> {
        let fields = validate_item(payload)?;
        let item = self.db.items().create(actor, fields).await?;

        info!(id = %item.id, actor = %actor.id, "Item created");
        Ok(item)
    }

    /// Lists the actor's items, filtered and sorted per the query.
    ///
    /// Only items owned by `actor` are ever returned.
    pub async fn list_items(
        &self,
        actor: &Principal,
        query: &ListItemsQuery,
    ) -> ApiResult<Vec<Item>> {
        let filter = ItemFilter {
            category: parse_category_filter(query.category.as_deref())?,
            name_contains: query
                .name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(String::from),
        };
        let sort = ItemSort {
            field: parse_sort_field(query.sort_by.as_deref())?,
            direction: parse_sort_direction(query.order.as_deref())?,
        };

        let items = self.db.items().list_by_owner(&actor.id, &filter, sort).await?;
        Ok(items)
    }

    /// Replaces all mutable fields of an item the actor owns.
    ///
    /// ## Errors
    /// * `VALIDATION_ERROR` - payload rejected
    /// * `NOT_FOUND` - no item with this id
    /// * `FORBIDDEN` - actor is not the owner
    pub async fn update_item(
        &self,
        item_id: &str,
        actor: &Principal,
        payload: &ItemPayload,
    ) -> ApiResult<Item> {
        let fields = validate_item(payload)?;
        let item = self.db.items().update(item_id, actor, fields).await?;

        info!(id = %item.id, actor = %actor.id, "Item updated");
        Ok(item)
    }

    /// Permanently deletes an item the actor owns. Its audit history is
    /// retained.
    pub async fn delete_item(
        &self,
        item_id: &str,
        actor: &Principal,
    ) -> ApiResult<DeleteItemResponse> {
        self.db.items().delete(item_id, actor).await?;

        info!(id = %item_id, actor = %actor.id, "Item deleted");
        Ok(DeleteItemResponse {
            message: "Item deleted successfully".to_string(),
        })
    }

    /// Adds or removes stock on an item the actor owns.
    ///
    /// ## Errors
    /// * `VALIDATION_ERROR` - unknown action or non-positive amount
    /// * `NOT_FOUND` / `FORBIDDEN` - as for update
    /// * `INSUFFICIENT_STOCK` - removal exceeds available quantity; nothing
    ///   is changed and nothing is logged
    pub async fn adjust_stock(
        &self,
        item_id: &str,
        actor: &Principal,
        payload: &AdjustmentPayload,
    ) -> ApiResult<AdjustStockResponse> {
        let adjustment = validate_adjustment(payload)?;
        let adjusted = self.db.items().adjust(item_id, actor, adjustment).await?;

        info!(
            id = %item_id,
            actor = %actor.id,
            action = %adjustment.action,
            amount = adjustment.amount,
            previous = adjusted.previous_quantity,
            new = adjusted.new_quantity,
            "Stock adjusted"
        );

        Ok(AdjustStockResponse {
            previous_quantity: adjusted.previous_quantity,
            new_quantity: adjusted.new_quantity,
            adjustment: adjusted.amount,
            item: adjusted.item,
        })
    }

    /// Lists the actor's own audit trail, newest first.
    ///
    /// Scoped to entries the actor recorded - including entries about items
    /// that have since been deleted.
    pub async fn list_audit_log(
        &self,
        actor: &Principal,
        query: &ListAuditQuery,
    ) -> ApiResult<Vec<AuditLogEntry>> {
        let filter = AuditFilter {
            action: parse_action_filter(query.action.as_deref())?,
            item_id: query.item_id.clone(),
        };
        let limit = effective_limit(query.limit);

        let entries = self
            .db
            .audit()
            .list_by_actor(&actor.id, &filter, limit)
            .await?;
        Ok(entries)
    }
}

// =============================================================================
// Query parsing
// =============================================================================

/// Applies the default and the hard cap to a requested audit limit.
fn effective_limit(requested: Option<u32>) -> u32 {
    match requested {
        None | Some(0) => DEFAULT_AUDIT_LIMIT,
        Some(n) => n.min(MAX_AUDIT_LIMIT),
    }
}

fn parse_category_filter(raw: Option<&str>) -> ApiResult<Option<Category>> {
    match raw {
        None | Some("all") => Ok(None),
        Some(s) => s.parse::<Category>().map(Some).map_err(|_| {
            ApiError::validation(vec![FieldIssue::new("category", "Invalid category")])
        }),
    }
}

fn parse_action_filter(raw: Option<&str>) -> ApiResult<Option<AuditAction>> {
    match raw {
        None | Some("all") => Ok(None),
        Some(s) => s.parse::<AuditAction>().map(Some).map_err(|_| {
            ApiError::validation(vec![FieldIssue::new("action", "Invalid action")])
        }),
    }
}

fn parse_sort_field(raw: Option<&str>) -> ApiResult<SortField> {
    match raw {
        None => Ok(SortField::CreatedAt),
        Some("name") => Ok(SortField::Name),
        Some("category") => Ok(SortField::Category),
        Some("quantity") => Ok(SortField::Quantity),
        Some("createdAt") => Ok(SortField::CreatedAt),
        Some("updatedAt") => Ok(SortField::UpdatedAt),
        Some(_) => Err(ApiError::validation(vec![FieldIssue::new(
            "sortBy",
            "Invalid sort field",
        )])),
    }
}

fn parse_sort_direction(raw: Option<&str>) -> ApiResult<SortDirection> {
    match raw {
        None | Some("desc") => Ok(SortDirection::Desc),
        Some("asc") => Ok(SortDirection::Asc),
        Some(_) => Err(ApiError::validation(vec![FieldIssue::new(
            "order",
            "Invalid sort order",
        )])),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_caps() {
        assert_eq!(effective_limit(None), 100);
        assert_eq!(effective_limit(Some(0)), 100);
        assert_eq!(effective_limit(Some(42)), 42);
        assert_eq!(effective_limit(Some(10_000)), 500);
    }

    #[test]
    fn category_all_means_no_filter() {
        assert_eq!(parse_category_filter(None).unwrap(), None);
        assert_eq!(parse_category_filter(Some("all")).unwrap(), None);
        assert_eq!(
            parse_category_filter(Some("cheese")).unwrap(),
            Some(Category::Cheese)
        );
        assert!(parse_category_filter(Some("weapons")).is_err());
    }

    #[test]
    fn sort_parsing_accepts_wire_names() {
        assert_eq!(parse_sort_field(Some("createdAt")).unwrap(), SortField::CreatedAt);
        assert_eq!(parse_sort_field(Some("name")).unwrap(), SortField::Name);
        assert_eq!(parse_sort_field(None).unwrap(), SortField::CreatedAt);
        assert!(parse_sort_field(Some("owner")).is_err());

        assert_eq!(parse_sort_direction(Some("asc")).unwrap(), SortDirection::Asc);
        assert_eq!(parse_sort_direction(None).unwrap(), SortDirection::Desc);
        assert!(parse_sort_direction(Some("sideways")).is_err());
    }

    #[test]
    fn action_filter_parses_snake_case() {
        assert_eq!(
            parse_action_filter(Some("stock_remove")).unwrap(),
            Some(AuditAction::StockRemove)
        );
        assert_eq!(parse_action_filter(Some("all")).unwrap(), None);
        assert!(parse_action_filter(Some("explode")).is_err());
    }
}
