//! # Item Repository
//!
//! Database operations for stock items, including the only sanctioned
//! paths for changing an item's quantity.
//!
//! ## Compound Write Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │              One Mutation = One Transaction                         │
//! │                                                                     │
//! │  BEGIN IMMEDIATE  ← takes the write lock up front, so the read     │
//! │       │             below can never go stale under a concurrent    │
//! │       │             writer (SQLite is single-writer)               │
//! │       ▼                                                             │
//! │  load current item ──► NotFound?                                    │
//! │       ▼                                                             │
//! │  ensure_owner ──► Forbidden? (rollback: no write, no entry)         │
//! │       ▼                                                             │
//! │  item write (conditional for stock removal)                         │
//! │       ▼                                                             │
//! │  audit append (same transaction)                                    │
//! │       ▼                                                             │
//! │  COMMIT ← item state and its audit entry become visible together    │
//! │                                                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A reader can never observe an item's new quantity without the matching
//! audit entry, and a failed mutation leaves neither behind.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::audit::append_entry;
use doughtrack_core::{
    ensure_owner, next_quantity, AdjustAction, AuditAction, AuditLogEntry, AuditMeta, CoreError,
    Item, ItemChanges, ItemFilter, ItemSort, Principal, SortDirection, SortField, ValidAdjustment,
    ValidItem,
};

/// Columns of the `items` table, in schema order.
const ITEM_COLUMNS: &str =
    "id, name, category, unit, quantity, reorder_threshold, cost_price, owner_id, created_at, updated_at";

/// Outcome of a successful stock adjustment.
#[derive(Debug, Clone, PartialEq)]
pub struct Adjustment {
    /// The item after the adjustment.
    pub item: Item,

    /// Quantity immediately before the adjustment.
    pub previous_quantity: f64,

    /// Quantity immediately after the adjustment.
    pub new_quantity: f64,

    /// The requested amount.
    pub amount: f64,
}

/// Repository for item database operations.
///
/// Every mutating method writes the item change **and** its audit entry in
/// one IMMEDIATE transaction; there is no way to commit one without the
/// other.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    /// Creates a new ItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets an item by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Item))` - Item found
    /// * `Ok(None)` - Item not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Item>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1");
        let item = sqlx::query_as::<_, Item>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    /// Lists items owned by a principal.
    ///
    /// Only items whose `owner_id` equals `owner_id` are ever returned,
    /// regardless of filter values. Provided filter predicates are ANDed;
    /// the name match is a case-insensitive substring.
    pub async fn list_by_owner(
        &self,
        owner_id: &str,
        filter: &ItemFilter,
        sort: ItemSort,
    ) -> DbResult<Vec<Item>> {
        debug!(owner_id = %owner_id, ?filter, "Listing items");

        let mut sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE owner_id = ?");
        if filter.category.is_some() {
            sql.push_str(" AND category = ?");
        }
        if filter.name_contains.is_some() {
            sql.push_str(" AND name LIKE ? ESCAPE '\\'");
        }
        sql.push_str(&format!(
            " ORDER BY {} {}",
            sort_column(sort.field),
            sort_keyword(sort.direction)
        ));

        let mut query = sqlx::query_as::<_, Item>(&sql).bind(owner_id);
        if let Some(category) = filter.category {
            query = query.bind(category);
        }
        if let Some(name) = &filter.name_contains {
            query = query.bind(format!("%{}%", escape_like(name)));
        }

        let items = query.fetch_all(&self.pool).await?;

        debug!(count = items.len(), "Listing returned items");
        Ok(items)
    }

    // =========================================================================
    // Mutations (item write + audit append, one transaction each)
    // =========================================================================

    /// Creates a new item owned by `owner`.
    ///
    /// Assigns identity and timestamps, persists the item and appends its
    /// `create` audit entry in the same transaction.
    pub async fn create(&self, owner: &Principal, fields: ValidItem) -> DbResult<Item> {
        let now = Utc::now();
        let item = Item {
            id: Uuid::new_v4().to_string(),
            name: fields.name,
            category: fields.category,
            unit: fields.unit,
            quantity: fields.quantity,
            reorder_threshold: fields.reorder_threshold,
            cost_price: fields.cost_price,
            owner_id: owner.id.clone(),
            created_at: now,
            updated_at: now,
        };

        debug!(id = %item.id, name = %item.name, "Creating item");

        let mut conn = self.pool.acquire().await?;
        begin_immediate(&mut conn).await?;
        match create_in_tx(&mut conn, &item, owner).await {
            Ok(()) => {
                commit(&mut conn).await?;
                Ok(item)
            }
            Err(e) => {
                rollback(&mut conn).await;
                Err(e)
            }
        }
    }

    /// Replaces all mutable fields of an item.
    ///
    /// ## Returns
    /// The updated item; `updated_at` is always refreshed. The `update`
    /// audit entry records the field-level diff between old and new state.
    ///
    /// ## Failure modes
    /// * `NotFound` - no item with this id
    /// * `Forbidden` - requester is not the owner (no write, no entry)
    pub async fn update(
        &self,
        item_id: &str,
        requester: &Principal,
        fields: ValidItem,
    ) -> DbResult<Item> {
        debug!(id = %item_id, "Updating item");

        let mut conn = self.pool.acquire().await?;
        begin_immediate(&mut conn).await?;
        match update_in_tx(&mut conn, item_id, requester, fields).await {
            Ok(item) => {
                commit(&mut conn).await?;
                Ok(item)
            }
            Err(e) => {
                rollback(&mut conn).await;
                Err(e)
            }
        }
    }

    /// Permanently deletes an item.
    ///
    /// The final `delete` audit entry (carrying a full item snapshot) is
    /// appended in the same transaction that removes the row; earlier
    /// entries about the item remain untouched forever.
    pub async fn delete(&self, item_id: &str, requester: &Principal) -> DbResult<()> {
        debug!(id = %item_id, "Deleting item");

        let mut conn = self.pool.acquire().await?;
        begin_immediate(&mut conn).await?;
        match delete_in_tx(&mut conn, item_id, requester).await {
            Ok(()) => commit(&mut conn).await,
            Err(e) => {
                rollback(&mut conn).await;
                Err(e)
            }
        }
    }

    /// Adjusts an item's stock level.
    ///
    /// The only sanctioned path for changing `quantity` outside a full
    /// update. The subtraction is pushed down as a conditional UPDATE
    /// (`... AND quantity >= amount` for removals) so the non-negative
    /// invariant holds at the storage level no matter what races; the
    /// IMMEDIATE transaction serializes concurrent adjustments so exactly
    /// as many removals succeed as stock allows.
    ///
    /// ## Failure modes
    /// * `NotFound` / `Forbidden` - as for update
    /// * `InsufficientStock` - removal would drive quantity negative;
    ///   nothing is written and no audit entry is produced
    pub async fn adjust(
        &self,
        item_id: &str,
        requester: &Principal,
        adjustment: ValidAdjustment,
    ) -> DbResult<Adjustment> {
        debug!(
            id = %item_id,
            action = %adjustment.action,
            amount = adjustment.amount,
            "Adjusting stock"
        );

        let mut conn = self.pool.acquire().await?;
        begin_immediate(&mut conn).await?;
        match adjust_in_tx(&mut conn, item_id, requester, adjustment).await {
            Ok(adjusted) => {
                commit(&mut conn).await?;
                Ok(adjusted)
            }
            Err(e) => {
                rollback(&mut conn).await;
                Err(e)
            }
        }
    }

}

// =============================================================================
// Transaction bodies
// =============================================================================
// Each body runs with the write lock already held (BEGIN IMMEDIATE), so the
// load-check-write sequence cannot interleave with another mutation.

async fn create_in_tx(conn: &mut SqliteConnection, item: &Item, owner: &Principal) -> DbResult<()> {
    let sql = format!(
        "INSERT INTO items ({ITEM_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
    );
    sqlx::query(&sql)
        .bind(&item.id)
        .bind(&item.name)
        .bind(item.category)
        .bind(item.unit)
        .bind(item.quantity)
        .bind(item.reorder_threshold)
        .bind(item.cost_price)
        .bind(&item.owner_id)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&mut *conn)
        .await?;

    let entry = audit_entry(
        &item.id,
        AuditAction::Create,
        None,
        Some(item.quantity),
        owner,
        AuditMeta::Create {
            item_name: item.name.clone(),
        },
        item.created_at,
    );
    append_entry(conn, &entry).await
}

async fn update_in_tx(
    conn: &mut SqliteConnection,
    item_id: &str,
    requester: &Principal,
    fields: ValidItem,
) -> DbResult<Item> {
    let old = load_item(conn, item_id).await?;
    ensure_owner(&old.owner_id, &requester.id, item_id)?;

    let now = Utc::now();
    let sql = format!(
        "UPDATE items SET name = ?1, category = ?2, unit = ?3, quantity = ?4, \
         reorder_threshold = ?5, cost_price = ?6, updated_at = ?7 \
         WHERE id = ?8 RETURNING {ITEM_COLUMNS}"
    );
    let updated = sqlx::query_as::<_, Item>(&sql)
        .bind(&fields.name)
        .bind(fields.category)
        .bind(fields.unit)
        .bind(fields.quantity)
        .bind(fields.reorder_threshold)
        .bind(fields.cost_price)
        .bind(now)
        .bind(item_id)
        .fetch_one(&mut *conn)
        .await?;

    let changes = ItemChanges::between(&old, &updated);
    let entry = audit_entry(
        item_id,
        AuditAction::Update,
        Some(old.quantity),
        Some(updated.quantity),
        requester,
        AuditMeta::Update {
            item_name: updated.name.clone(),
            changes,
        },
        now,
    );
    append_entry(conn, &entry).await?;

    Ok(updated)
}

async fn delete_in_tx(
    conn: &mut SqliteConnection,
    item_id: &str,
    requester: &Principal,
) -> DbResult<()> {
    let item = load_item(conn, item_id).await?;
    ensure_owner(&item.owner_id, &requester.id, item_id)?;

    // The entry lands first, the row goes second; the transaction makes
    // the pair atomic either way.
    let entry = audit_entry(
        item_id,
        AuditAction::Delete,
        Some(item.quantity),
        None,
        requester,
        AuditMeta::Delete {
            item_name: item.name.clone(),
            snapshot: item.clone(),
        },
        Utc::now(),
    );
    append_entry(conn, &entry).await?;

    sqlx::query("DELETE FROM items WHERE id = ?1")
        .bind(item_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

async fn adjust_in_tx(
    conn: &mut SqliteConnection,
    item_id: &str,
    requester: &Principal,
    adjustment: ValidAdjustment,
) -> DbResult<Adjustment> {
    let old = load_item(conn, item_id).await?;
    ensure_owner(&old.owner_id, &requester.id, item_id)?;

    // Single statement of the non-negative rule; the conditional UPDATE
    // below enforces the same rule at the storage level.
    next_quantity(old.quantity, &adjustment).map_err(|e| match e {
        CoreError::InsufficientStock {
            available,
            requested,
        } => DbError::InsufficientStock {
            item_id: item_id.to_string(),
            available,
            requested,
        },
        other => other.into(),
    })?;

    let now = Utc::now();
    let sql = match adjustment.action {
        AdjustAction::Add => format!(
            "UPDATE items SET quantity = quantity + ?1, updated_at = ?2 \
             WHERE id = ?3 RETURNING {ITEM_COLUMNS}"
        ),
        AdjustAction::Remove => format!(
            "UPDATE items SET quantity = quantity - ?1, updated_at = ?2 \
             WHERE id = ?3 AND quantity >= ?1 RETURNING {ITEM_COLUMNS}"
        ),
    };
    let updated = sqlx::query_as::<_, Item>(&sql)
        .bind(adjustment.amount)
        .bind(now)
        .bind(item_id)
        .fetch_optional(&mut *conn)
        .await?
        // We hold the write lock and just read the row, so the predicate
        // cannot fail here.
        .ok_or_else(|| DbError::Internal(format!("conditional adjust lost item {item_id}")))?;

    let entry = audit_entry(
        item_id,
        adjustment.action.audit_action(),
        Some(old.quantity),
        Some(updated.quantity),
        requester,
        AuditMeta::Adjust {
            item_name: updated.name.clone(),
            amount: adjustment.amount,
            action: adjustment.action,
        },
        now,
    );
    append_entry(conn, &entry).await?;

    Ok(Adjustment {
        previous_quantity: old.quantity,
        new_quantity: updated.quantity,
        amount: adjustment.amount,
        item: updated,
    })
}

/// Loads an item inside a transaction, mapping absence to NotFound.
async fn load_item(conn: &mut SqliteConnection, item_id: &str) -> DbResult<Item> {
    let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1");
    sqlx::query_as::<_, Item>(&sql)
        .bind(item_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("Item", item_id))
}

/// Builds an audit entry for a mutation performed by `actor`.
fn audit_entry(
    item_id: &str,
    action: AuditAction,
    previous_quantity: Option<f64>,
    new_quantity: Option<f64>,
    actor: &Principal,
    metadata: AuditMeta,
    at: DateTime<Utc>,
) -> AuditLogEntry {
    AuditLogEntry {
        id: Uuid::new_v4().to_string(),
        item_id: item_id.to_string(),
        action,
        previous_quantity,
        new_quantity,
        actor_id: actor.id.clone(),
        actor_name: actor.display_name.clone(),
        metadata,
        created_at: at,
    }
}

// =============================================================================
// Transaction control
// =============================================================================
// sqlx's pool transactions begin DEFERRED; a deferred read-then-write under
// WAL can fail with a stale snapshot instead of queueing. IMMEDIATE takes
// the write lock at BEGIN, so mutations queue behind busy_timeout and the
// in-transaction read is authoritative.

async fn begin_immediate(conn: &mut SqliteConnection) -> DbResult<()> {
    sqlx::query("BEGIN IMMEDIATE")
        .execute(&mut *conn)
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
    Ok(())
}

async fn commit(conn: &mut SqliteConnection) -> DbResult<()> {
    if let Err(e) = sqlx::query("COMMIT").execute(&mut *conn).await {
        // A failed COMMIT leaves the transaction open; close it before the
        // connection goes back to the pool.
        rollback(&mut *conn).await;
        return Err(DbError::TransactionFailed(e.to_string()));
    }
    Ok(())
}

async fn rollback(conn: &mut SqliteConnection) {
    // Best effort: the error path is already unwinding with its own error.
    if let Err(e) = sqlx::query("ROLLBACK").execute(&mut *conn).await {
        tracing::error!(error = %e, "Rollback failed");
    }
}

// =============================================================================
// Listing helpers
// =============================================================================

/// Maps a sort field to its column. Closed enum, so this is the only place
/// a sort identifier can originate - never caller input.
fn sort_column(field: SortField) -> &'static str {
    match field {
        SortField::Name => "name",
        SortField::Category => "category",
        SortField::Quantity => "quantity",
        SortField::CreatedAt => "created_at",
        SortField::UpdatedAt => "updated_at",
    }
}

fn sort_keyword(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Asc => "ASC",
        SortDirection::Desc => "DESC",
    }
}

/// Escapes LIKE wildcards in a user-supplied substring.
fn escape_like(fragment: &str) -> String {
    fragment
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_like_neutralizes_wildcards() {
        assert_eq!(escape_like("50% rye"), "50\\% rye");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn sort_columns_cover_every_field() {
        assert_eq!(sort_column(SortField::Name), "name");
        assert_eq!(sort_column(SortField::Category), "category");
        assert_eq!(sort_column(SortField::Quantity), "quantity");
        assert_eq!(sort_column(SortField::CreatedAt), "created_at");
        assert_eq!(sort_column(SortField::UpdatedAt), "updated_at");
        assert_eq!(sort_keyword(SortDirection::Asc), "ASC");
        assert_eq!(sort_keyword(SortDirection::Desc), "DESC");
    }
}
