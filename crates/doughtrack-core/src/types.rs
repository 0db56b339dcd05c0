//! # Domain Types
//!
//! Core domain types used throughout DoughTrack.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌─────────────────┐   ┌──────────────────┐   ┌─────────────────┐  │
//! │  │      Item       │   │  AuditLogEntry   │   │    Principal    │  │
//! │  │  ─────────────  │   │  ──────────────  │   │  ─────────────  │  │
//! │  │  id (UUID)      │   │  id (UUID)       │   │  id             │  │
//! │  │  name           │   │  item_id (weak)  │   │  display_name   │  │
//! │  │  quantity       │   │  action          │   └─────────────────┘  │
//! │  │  owner_id       │   │  prev/new qty    │                        │
//! │  └─────────────────┘   │  metadata        │                        │
//! │                        └──────────────────┘                        │
//! │                                                                     │
//! │  ┌─────────────────┐   ┌──────────────────┐   ┌─────────────────┐  │
//! │  │    Category     │   │   AuditAction    │   │  AdjustAction   │  │
//! │  │  ─────────────  │   │  ──────────────  │   │  ─────────────  │  │
//! │  │  Dough, Sauce   │   │  Create, Update  │   │  Add            │  │
//! │  │  Cheese, ...    │   │  Delete,         │   │  Remove         │  │
//! │  └─────────────────┘   │  StockAdd/Remove │   └─────────────────┘  │
//! │                        └──────────────────┘                        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity uses a UUID v4 string `id` - immutable, assigned at
//! creation. Items additionally carry an immutable `owner_id`: the
//! principal recorded at creation, the only principal permitted to mutate
//! the item.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Principal
// =============================================================================

/// The authenticated identity a command executes on behalf of.
///
/// Identity issuance and credential checks happen outside the ledger; by
/// the time a `Principal` reaches this crate it is already trusted. The
/// display name is captured into audit entries at mutation time and never
/// re-resolved later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Opaque principal identifier (e.g. an external auth subject id).
    pub id: String,

    /// Human-readable name, snapshotted into audit entries.
    pub display_name: String,
}

impl Principal {
    /// Creates a principal from an id and display name.
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Principal {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

// =============================================================================
// Closed Enumerations
// =============================================================================

/// Item category. Closed set - the validator rejects anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
pub enum Category {
    Dough,
    Sauce,
    Cheese,
    Toppings,
    Packaging,
    Beverages,
    Other,
}

impl Category {
    /// All categories, in display order.
    pub const ALL: [Category; 7] = [
        Category::Dough,
        Category::Sauce,
        Category::Cheese,
        Category::Toppings,
        Category::Packaging,
        Category::Beverages,
        Category::Other,
    ];

    /// The lowercase wire name of this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Dough => "dough",
            Category::Sauce => "sauce",
            Category::Cheese => "cheese",
            Category::Toppings => "toppings",
            Category::Packaging => "packaging",
            Category::Beverages => "beverages",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dough" => Ok(Category::Dough),
            "sauce" => Ok(Category::Sauce),
            "cheese" => Ok(Category::Cheese),
            "toppings" => Ok(Category::Toppings),
            "packaging" => Ok(Category::Packaging),
            "beverages" => Ok(Category::Beverages),
            "other" => Ok(Category::Other),
            _ => Err(()),
        }
    }
}

/// Unit of measure for an item's quantity. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
pub enum Unit {
    Kg,
    G,
    L,
    Ml,
    Pcs,
    Boxes,
}

impl Unit {
    /// All units, in display order.
    pub const ALL: [Unit; 6] = [Unit::Kg, Unit::G, Unit::L, Unit::Ml, Unit::Pcs, Unit::Boxes];

    /// The lowercase wire name of this unit.
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Kg => "kg",
            Unit::G => "g",
            Unit::L => "l",
            Unit::Ml => "ml",
            Unit::Pcs => "pcs",
            Unit::Boxes => "boxes",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kg" => Ok(Unit::Kg),
            "g" => Ok(Unit::G),
            "l" => Ok(Unit::L),
            "ml" => Ok(Unit::Ml),
            "pcs" => Ok(Unit::Pcs),
            "boxes" => Ok(Unit::Boxes),
            _ => Err(()),
        }
    }
}

// =============================================================================
// Item
// =============================================================================

/// A perishable stock item, owned by exactly one principal.
///
/// `quantity >= 0` holds at all times on any persisted item; the only path
/// that changes `quantity` after creation is a stock adjustment or a full
/// update, and both append an audit entry in the same transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Item {
    /// Unique identifier (UUID v4). Immutable.
    pub id: String,

    /// Display name, trimmed, 1-100 characters.
    pub name: String,

    /// Item category.
    pub category: Category,

    /// Unit of measure for `quantity`.
    pub unit: Unit,

    /// Current stock level. Invariant: `quantity >= 0`.
    pub quantity: f64,

    /// Reorder point. Informational only - nothing is enforced beyond
    /// non-negativity.
    pub reorder_threshold: f64,

    /// Cost per unit.
    pub cost_price: f64,

    /// Principal that created the item. Set once, never mutated.
    pub owner_id: String,

    /// When the item was created.
    pub created_at: DateTime<Utc>,

    /// When the item was last mutated. Refreshed on every successful write.
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Whether the item is at or below its reorder threshold.
    pub fn needs_reorder(&self) -> bool {
        self.quantity <= self.reorder_threshold
    }
}

// =============================================================================
// Audit Log
// =============================================================================

/// The kind of mutation an audit entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    StockAdd,
    StockRemove,
}

impl AuditAction {
    /// The snake_case wire name of this action.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
            AuditAction::StockAdd => "stock_add",
            AuditAction::StockRemove => "stock_remove",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(AuditAction::Create),
            "update" => Ok(AuditAction::Update),
            "delete" => Ok(AuditAction::Delete),
            "stock_add" => Ok(AuditAction::StockAdd),
            "stock_remove" => Ok(AuditAction::StockRemove),
            _ => Err(()),
        }
    }
}

/// Direction of a stock adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustAction {
    Add,
    Remove,
}

impl AdjustAction {
    /// The audit action this adjustment direction records.
    pub fn audit_action(&self) -> AuditAction {
        match self {
            AdjustAction::Add => AuditAction::StockAdd,
            AdjustAction::Remove => AuditAction::StockRemove,
        }
    }
}

impl fmt::Display for AdjustAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdjustAction::Add => f.write_str("add"),
            AdjustAction::Remove => f.write_str("remove"),
        }
    }
}

/// A before/after pair for a single changed field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange<T> {
    pub from: T,
    pub to: T,
}

impl<T: PartialEq + Clone> FieldChange<T> {
    /// Returns the change between two values, or `None` if they are equal.
    pub fn between(from: &T, to: &T) -> Option<Self> {
        if from == to {
            None
        } else {
            Some(FieldChange {
                from: from.clone(),
                to: to.clone(),
            })
        }
    }
}

/// Field-level diffs recorded on an `update` audit entry.
///
/// Unchanged fields are omitted from the serialized form entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<FieldChange<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<FieldChange<Category>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<FieldChange<Unit>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<FieldChange<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reorder_threshold: Option<FieldChange<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_price: Option<FieldChange<f64>>,
}

impl ItemChanges {
    /// Computes the field-level diff between two item states.
    pub fn between(old: &Item, new: &Item) -> Self {
        ItemChanges {
            name: FieldChange::between(&old.name, &new.name),
            category: FieldChange::between(&old.category, &new.category),
            unit: FieldChange::between(&old.unit, &new.unit),
            quantity: FieldChange::between(&old.quantity, &new.quantity),
            reorder_threshold: FieldChange::between(&old.reorder_threshold, &new.reorder_threshold),
            cost_price: FieldChange::between(&old.cost_price, &new.cost_price),
        }
    }

    /// Whether no field changed.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.unit.is_none()
            && self.quantity.is_none()
            && self.reorder_threshold.is_none()
            && self.cost_price.is_none()
    }
}

/// Action-specific context carried by an audit entry.
///
/// One variant per action kind, so audit entries stay machine-verifiable
/// instead of an open map. Serialization is untagged: each variant's field
/// set is distinct, and the JSON matches what external log readers already
/// parse (`itemName`, `changes`, `itemData`, `adjustmentAmount`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuditMeta {
    /// Full item snapshot taken immediately before deletion.
    Delete {
        #[serde(rename = "itemName")]
        item_name: String,
        #[serde(rename = "itemData")]
        snapshot: Item,
    },

    /// Field-level diffs for a full update.
    Update {
        #[serde(rename = "itemName")]
        item_name: String,
        changes: ItemChanges,
    },

    /// Requested amount and direction for a stock adjustment.
    Adjust {
        #[serde(rename = "itemName")]
        item_name: String,
        #[serde(rename = "adjustmentAmount")]
        amount: f64,
        action: AdjustAction,
    },

    /// Name snapshot at creation time.
    Create {
        #[serde(rename = "itemName")]
        item_name: String,
    },
}

impl AuditMeta {
    /// The item name snapshot carried by every variant.
    pub fn item_name(&self) -> &str {
        match self {
            AuditMeta::Create { item_name }
            | AuditMeta::Update { item_name, .. }
            | AuditMeta::Delete { item_name, .. }
            | AuditMeta::Adjust { item_name, .. } => item_name,
        }
    }
}

/// One immutable fact about one item mutation.
///
/// Created exactly once per mutation, in the same transaction as the item
/// write. Never updated or deleted afterwards - including when the subject
/// item is deleted (whose deletion produces the final entry referencing it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Subject item. Weak reference: survives item deletion and is never
    /// used to re-derive ownership after the fact.
    pub item_id: String,

    /// What kind of mutation happened.
    pub action: AuditAction,

    /// Quantity immediately before the mutation, when it changed quantity.
    pub previous_quantity: Option<f64>,

    /// Quantity immediately after the mutation, when it changed quantity.
    pub new_quantity: Option<f64>,

    /// Principal that performed the action.
    pub actor_id: String,

    /// Actor display name captured at the time of the action.
    pub actor_name: String,

    /// Action-specific context.
    pub metadata: AuditMeta,

    /// When the entry was written. Set once.
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Listing: Filters & Sort
// =============================================================================

/// Owner-scoped item listing filter. Provided predicates are ANDed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemFilter {
    /// Only items in this category.
    pub category: Option<Category>,

    /// Case-insensitive substring match on the item name.
    pub name_contains: Option<String>,
}

/// Sortable item columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Name,
    Category,
    Quantity,
    CreatedAt,
    UpdatedAt,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Item listing sort order. Defaults to newest-created first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemSort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for ItemSort {
    fn default() -> Self {
        ItemSort {
            field: SortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

/// Actor-scoped audit listing filter. Provided predicates are ANDed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditFilter {
    /// Only entries recording this action.
    pub action: Option<AuditAction>,

    /// Only entries about this item (including deleted items).
    pub item_id: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_item() -> Item {
        Item {
            id: "11111111-1111-4111-8111-111111111111".to_string(),
            name: "Mozzarella".to_string(),
            category: Category::Cheese,
            unit: Unit::Kg,
            quantity: 12.5,
            reorder_threshold: 5.0,
            cost_price: 7.8,
            owner_id: "user_1".to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 1, 10, 8, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2026, 1, 10, 8, 0, 0).unwrap(),
        }
    }

    #[test]
    fn category_round_trips_through_str() {
        for cat in Category::ALL {
            assert_eq!(cat.as_str().parse::<Category>(), Ok(cat));
        }
        assert!("bread".parse::<Category>().is_err());
    }

    #[test]
    fn unit_round_trips_through_str() {
        for unit in Unit::ALL {
            assert_eq!(unit.as_str().parse::<Unit>(), Ok(unit));
        }
        assert!("tons".parse::<Unit>().is_err());
    }

    #[test]
    fn adjust_action_maps_to_audit_action() {
        assert_eq!(AdjustAction::Add.audit_action(), AuditAction::StockAdd);
        assert_eq!(AdjustAction::Remove.audit_action(), AuditAction::StockRemove);
    }

    #[test]
    fn item_changes_records_only_changed_fields() {
        let old = sample_item();
        let mut new = old.clone();
        new.category = Category::Toppings;
        new.quantity = 9.0;

        let changes = ItemChanges::between(&old, &new);
        assert!(changes.name.is_none());
        assert_eq!(
            changes.category,
            Some(FieldChange {
                from: Category::Cheese,
                to: Category::Toppings
            })
        );
        assert_eq!(changes.quantity, Some(FieldChange { from: 12.5, to: 9.0 }));
        assert!(!changes.is_empty());
        assert!(ItemChanges::between(&old, &old).is_empty());
    }

    #[test]
    fn unchanged_fields_are_omitted_from_json() {
        let old = sample_item();
        let mut new = old.clone();
        new.quantity = 9.0;

        let json = serde_json::to_value(ItemChanges::between(&old, &new)).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        assert_eq!(obj["quantity"]["from"], 12.5);
        assert_eq!(obj["quantity"]["to"], 9.0);
    }

    #[test]
    fn audit_meta_serializes_original_field_names() {
        let meta = AuditMeta::Adjust {
            item_name: "Mozzarella".to_string(),
            amount: 3.0,
            action: AdjustAction::Remove,
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["itemName"], "Mozzarella");
        assert_eq!(json["adjustmentAmount"], 3.0);
        assert_eq!(json["action"], "remove");
    }

    #[test]
    fn audit_meta_round_trips_each_variant() {
        let variants = vec![
            AuditMeta::Create {
                item_name: "Flour".to_string(),
            },
            AuditMeta::Update {
                item_name: "Flour".to_string(),
                changes: ItemChanges::between(&sample_item(), &sample_item()),
            },
            AuditMeta::Delete {
                item_name: "Flour".to_string(),
                snapshot: sample_item(),
            },
            AuditMeta::Adjust {
                item_name: "Flour".to_string(),
                amount: 2.0,
                action: AdjustAction::Add,
            },
        ];

        for meta in variants {
            let json = serde_json::to_string(&meta).unwrap();
            let back: AuditMeta = serde_json::from_str(&json).unwrap();
            assert_eq!(back, meta);
        }
    }

    #[test]
    fn default_sort_is_created_at_desc() {
        let sort = ItemSort::default();
        assert_eq!(sort.field, SortField::CreatedAt);
        assert_eq!(sort.direction, SortDirection::Desc);
    }
}
