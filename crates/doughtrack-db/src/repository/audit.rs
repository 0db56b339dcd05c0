//! # Audit Log Repository
//!
//! Append and query operations for the audit trail.
//!
//! ## Append-Only
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         audit_log                                   │
//! │                                                                     │
//! │  append_entry ──► INSERT       ← only from inside a mutation's      │
//! │                                  transaction (crate-private)        │
//! │                                                                     │
//! │  list_by_actor ──► SELECT      ← actor-scoped, newest first         │
//! │                                                                     │
//! │  UPDATE / DELETE               ← no such operation exists           │
//! │                                                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Entries reference items by id only (no foreign key), so deleting an
//! item never disturbs its history.

use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use doughtrack_core::{AuditAction, AuditFilter, AuditLogEntry, AuditMeta};

/// Row shape of the `audit_log` table. The metadata column holds the
/// serialized [`AuditMeta`] JSON.
#[derive(Debug, FromRow)]
struct AuditRow {
    id: String,
    item_id: String,
    action: AuditAction,
    previous_quantity: Option<f64>,
    new_quantity: Option<f64>,
    actor_id: String,
    actor_name: String,
    metadata: sqlx::types::Json<AuditMeta>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<AuditRow> for AuditLogEntry {
    fn from(row: AuditRow) -> Self {
        AuditLogEntry {
            id: row.id,
            item_id: row.item_id,
            action: row.action,
            previous_quantity: row.previous_quantity,
            new_quantity: row.new_quantity,
            actor_id: row.actor_id,
            actor_name: row.actor_name,
            metadata: row.metadata.0,
            created_at: row.created_at,
        }
    }
}

/// Appends one audit entry inside the caller's transaction.
///
/// Crate-private on purpose: the only writers are the item mutations, which
/// call this before their COMMIT. There is no public append, and no update
/// or delete at all.
pub(crate) async fn append_entry(
    conn: &mut SqliteConnection,
    entry: &AuditLogEntry,
) -> DbResult<()> {
    sqlx::query(
        "INSERT INTO audit_log \
         (id, item_id, action, previous_quantity, new_quantity, \
          actor_id, actor_name, metadata, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )
    .bind(&entry.id)
    .bind(&entry.item_id)
    .bind(entry.action)
    .bind(entry.previous_quantity)
    .bind(entry.new_quantity)
    .bind(&entry.actor_id)
    .bind(&entry.actor_name)
    .bind(sqlx::types::Json(&entry.metadata))
    .bind(entry.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Read-side repository for the audit trail.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    pool: SqlitePool,
}

impl AuditRepository {
    /// Creates a new AuditRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AuditRepository { pool }
    }

    /// Lists audit entries recorded by one actor, newest first.
    ///
    /// Scoped to `actor_id` unconditionally - filters narrow within that
    /// scope, never widen it. Entries for deleted items are included; the
    /// trail outlives the items it describes.
    ///
    /// ## Arguments
    /// * `filter` - optional action and item-id predicates (ANDed)
    /// * `limit` - maximum number of entries returned
    pub async fn list_by_actor(
        &self,
        actor_id: &str,
        filter: &AuditFilter,
        limit: u32,
    ) -> DbResult<Vec<AuditLogEntry>> {
        debug!(actor_id = %actor_id, ?filter, limit, "Listing audit entries");

        let mut sql = String::from(
            "SELECT id, item_id, action, previous_quantity, new_quantity, \
             actor_id, actor_name, metadata, created_at \
             FROM audit_log WHERE actor_id = ?",
        );
        if filter.action.is_some() {
            sql.push_str(" AND action = ?");
        }
        if filter.item_id.is_some() {
            sql.push_str(" AND item_id = ?");
        }
        // rowid tiebreak keeps same-timestamp entries in insertion order
        sql.push_str(" ORDER BY created_at DESC, rowid DESC LIMIT ?");

        let mut query = sqlx::query_as::<_, AuditRow>(&sql).bind(actor_id);
        if let Some(action) = filter.action {
            query = query.bind(action);
        }
        if let Some(item_id) = &filter.item_id {
            query = query.bind(item_id);
        }
        query = query.bind(i64::from(limit));

        let rows = query.fetch_all(&self.pool).await?;

        debug!(count = rows.len(), "Audit listing returned entries");
        Ok(rows.into_iter().map(AuditLogEntry::from).collect())
    }
}
