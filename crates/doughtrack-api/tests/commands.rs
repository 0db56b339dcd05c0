//! End-to-end command tests: validation, ownership, stock invariants and
//! the audit trail, exercised through the `Inventory` surface exactly as an
//! embedder would.

use doughtrack_api::{ApiError, ErrorCode, Inventory, ListAuditQuery, ListItemsQuery};
use doughtrack_core::{AdjustmentPayload, AuditAction, AuditMeta, ItemPayload, Principal};
use doughtrack_db::{Database, DbConfig};

fn mario() -> Principal {
    Principal::new("user_mario", "Mario Rossi")
}

fn luigi() -> Principal {
    Principal::new("user_luigi", "Luigi Bianchi")
}

fn flour_payload(quantity: f64) -> ItemPayload {
    ItemPayload {
        name: "00 Flour".to_string(),
        category: "dough".to_string(),
        unit: "kg".to_string(),
        quantity: quantity.into(),
        reorder_threshold: 5.0.into(),
        cost_price: 1.2.into(),
    }
}

fn adjust_payload(action: &str, amount: f64) -> AdjustmentPayload {
    AdjustmentPayload {
        action: action.to_string(),
        amount: amount.into(),
    }
}

async fn inventory() -> Inventory {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    Inventory::new(db)
}

fn assert_code(err: &ApiError, code: ErrorCode) {
    assert_eq!(err.code, code, "unexpected error: {err:?}");
}

// =============================================================================
// Validation at the surface
// =============================================================================

#[tokio::test]
async fn create_rejects_bad_payload_with_every_field_issue() {
    let inv = inventory().await;

    let payload = ItemPayload {
        name: "   ".to_string(),
        category: "weapons".to_string(),
        unit: "kg".to_string(),
        quantity: (-1.0).into(),
        reorder_threshold: "not a number".into(),
        cost_price: 1.0.into(),
    };
    let err = inv.create_item(&mario(), &payload).await.unwrap_err();

    assert_code(&err, ErrorCode::ValidationError);
    let details = err.details.unwrap();
    let fields: Vec<&str> = details.iter().map(|i| i.field.as_str()).collect();
    assert_eq!(fields, ["name", "category", "quantity", "reorderThreshold"]);

    // Nothing was created and nothing was logged.
    let items = inv
        .list_items(&mario(), &ListItemsQuery::default())
        .await
        .unwrap();
    assert!(items.is_empty());
    let trail = inv
        .list_audit_log(&mario(), &ListAuditQuery::default())
        .await
        .unwrap();
    assert!(trail.is_empty());
}

#[tokio::test]
async fn numeric_strings_are_accepted() {
    let inv = inventory().await;

    let payload = ItemPayload {
        name: "San Marzano Tomatoes".to_string(),
        category: "sauce".to_string(),
        unit: "boxes".to_string(),
        quantity: "12".into(),
        reorder_threshold: " 3.5 ".into(),
        cost_price: "2.40".into(),
    };
    let item = inv.create_item(&mario(), &payload).await.unwrap();

    assert_eq!(item.quantity, 12.0);
    assert_eq!(item.reorder_threshold, 3.5);
    assert_eq!(item.cost_price, 2.4);
}

#[tokio::test]
async fn adjust_rejects_unknown_action_and_non_positive_amount() {
    let inv = inventory().await;
    let owner = mario();
    let item = inv.create_item(&owner, &flour_payload(10.0)).await.unwrap();

    let err = inv
        .adjust_stock(&item.id, &owner, &adjust_payload("destroy", 1.0))
        .await
        .unwrap_err();
    assert_code(&err, ErrorCode::ValidationError);

    let err = inv
        .adjust_stock(&item.id, &owner, &adjust_payload("add", 0.0))
        .await
        .unwrap_err();
    assert_code(&err, ErrorCode::ValidationError);
}

// =============================================================================
// Stock scenarios
// =============================================================================

#[tokio::test]
async fn remove_then_overdraw_scenario() {
    let inv = inventory().await;
    let owner = mario();
    let item = inv.create_item(&owner, &flour_payload(10.0)).await.unwrap();

    // qty 10, remove 4 → 6
    let resp = inv
        .adjust_stock(&item.id, &owner, &adjust_payload("remove", 4.0))
        .await
        .unwrap();
    assert_eq!(resp.previous_quantity, 10.0);
    assert_eq!(resp.new_quantity, 6.0);
    assert_eq!(resp.adjustment, 4.0);
    assert_eq!(resp.item.quantity, 6.0);

    // remove 10 → InsufficientStock, quantity stays 6
    let err = inv
        .adjust_stock(&item.id, &owner, &adjust_payload("remove", 10.0))
        .await
        .unwrap_err();
    assert_code(&err, ErrorCode::InsufficientStock);

    let items = inv
        .list_items(&owner, &ListItemsQuery::default())
        .await
        .unwrap();
    assert_eq!(items[0].quantity, 6.0);

    // Trail: create + one stock_remove, nothing for the failed attempt.
    let trail = inv
        .list_audit_log(&owner, &ListAuditQuery::default())
        .await
        .unwrap();
    assert_eq!(trail.len(), 2);
    assert_eq!(trail[0].action, AuditAction::StockRemove);
    assert_eq!(trail[0].previous_quantity, Some(10.0));
    assert_eq!(trail[0].new_quantity, Some(6.0));
    assert_eq!(trail[1].action, AuditAction::Create);
}

#[tokio::test]
async fn update_changing_two_fields_logs_one_entry_with_both_diffs() {
    let inv = inventory().await;
    let owner = mario();
    let item = inv.create_item(&owner, &flour_payload(10.0)).await.unwrap();

    let mut payload = flour_payload(7.0);
    payload.category = "other".to_string();
    inv.update_item(&item.id, &owner, &payload).await.unwrap();

    let trail = inv
        .list_audit_log(
            &owner,
            &ListAuditQuery {
                action: Some("update".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(trail.len(), 1);
    match &trail[0].metadata {
        AuditMeta::Update { changes, .. } => {
            assert!(changes.category.is_some());
            assert!(changes.quantity.is_some());
            assert!(changes.name.is_none());
            assert!(changes.unit.is_none());
        }
        other => panic!("expected update metadata, got {other:?}"),
    }
}

#[tokio::test]
async fn delete_keeps_the_dead_items_history() {
    let inv = inventory().await;
    let owner = mario();
    let item = inv.create_item(&owner, &flour_payload(10.0)).await.unwrap();

    let resp = inv.delete_item(&item.id, &owner).await.unwrap();
    assert_eq!(resp.message, "Item deleted successfully");

    let trail = inv
        .list_audit_log(
            &owner,
            &ListAuditQuery {
                item_id: Some(item.id.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(trail.len(), 2);
    assert_eq!(trail[0].action, AuditAction::Delete);
    assert_eq!(trail[1].action, AuditAction::Create);
    match &trail[0].metadata {
        AuditMeta::Delete { snapshot, .. } => assert_eq!(snapshot.id, item.id),
        other => panic!("expected delete metadata, got {other:?}"),
    }

    let err = inv.delete_item(&item.id, &owner).await.unwrap_err();
    assert_code(&err, ErrorCode::NotFound);
}

// =============================================================================
// Ownership
// =============================================================================

#[tokio::test]
async fn foreign_principal_cannot_mutate_or_see_items() {
    let inv = inventory().await;
    let owner = mario();
    let outsider = luigi();
    let item = inv.create_item(&owner, &flour_payload(10.0)).await.unwrap();

    let err = inv
        .update_item(&item.id, &outsider, &flour_payload(0.0))
        .await
        .unwrap_err();
    assert_code(&err, ErrorCode::Forbidden);

    let err = inv
        .adjust_stock(&item.id, &outsider, &adjust_payload("remove", 1.0))
        .await
        .unwrap_err();
    assert_code(&err, ErrorCode::Forbidden);

    let err = inv.delete_item(&item.id, &outsider).await.unwrap_err();
    assert_code(&err, ErrorCode::Forbidden);

    // Listings are principal-scoped in both directions.
    let theirs = inv
        .list_items(&outsider, &ListItemsQuery::default())
        .await
        .unwrap();
    assert!(theirs.is_empty());
    let their_trail = inv
        .list_audit_log(&outsider, &ListAuditQuery::default())
        .await
        .unwrap();
    assert!(their_trail.is_empty());
}

// =============================================================================
// Listing queries
// =============================================================================

#[tokio::test]
async fn list_items_honors_wire_query_shapes() {
    let inv = inventory().await;
    let owner = mario();

    inv.create_item(&owner, &flour_payload(10.0)).await.unwrap();
    let mut cheese = flour_payload(3.0);
    cheese.name = "Mozzarella".to_string();
    cheese.category = "cheese".to_string();
    inv.create_item(&owner, &cheese).await.unwrap();

    // "all" category is a no-op filter.
    let all = inv
        .list_items(
            &owner,
            &ListItemsQuery {
                category: Some("all".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    let sorted = inv
        .list_items(
            &owner,
            &ListItemsQuery {
                sort_by: Some("quantity".to_string()),
                order: Some("asc".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(sorted[0].name, "Mozzarella");
    assert_eq!(sorted[1].name, "00 Flour");

    let err = inv
        .list_items(
            &owner,
            &ListItemsQuery {
                sort_by: Some("ownerId".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_code(&err, ErrorCode::ValidationError);
}

#[tokio::test]
async fn audit_query_filters_and_limit() {
    let inv = inventory().await;
    let owner = mario();
    let item = inv.create_item(&owner, &flour_payload(50.0)).await.unwrap();
    for _ in 0..4 {
        inv.adjust_stock(&item.id, &owner, &adjust_payload("remove", 1.0))
            .await
            .unwrap();
    }

    let removals = inv
        .list_audit_log(
            &owner,
            &ListAuditQuery {
                action: Some("stock_remove".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(removals.len(), 4);

    let limited = inv
        .list_audit_log(
            &owner,
            &ListAuditQuery {
                limit: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(limited.len(), 2);

    let err = inv
        .list_audit_log(
            &owner,
            &ListAuditQuery {
                action: Some("explode".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_code(&err, ErrorCode::ValidationError);
}

// =============================================================================
// Wire shapes
// =============================================================================

#[tokio::test]
async fn responses_serialize_with_original_field_names() {
    let inv = inventory().await;
    let owner = mario();
    let item = inv.create_item(&owner, &flour_payload(10.0)).await.unwrap();

    let item_json = serde_json::to_value(&item).unwrap();
    assert!(item_json.get("reorderThreshold").is_some());
    assert!(item_json.get("costPrice").is_some());
    assert!(item_json.get("ownerId").is_some());

    let resp = inv
        .adjust_stock(&item.id, &owner, &adjust_payload("add", 2.5))
        .await
        .unwrap();
    let resp_json = serde_json::to_value(&resp).unwrap();
    assert_eq!(resp_json["previousQuantity"], 10.0);
    assert_eq!(resp_json["newQuantity"], 12.5);
    assert_eq!(resp_json["adjustment"], 2.5);

    let trail = inv
        .list_audit_log(&owner, &ListAuditQuery::default())
        .await
        .unwrap();
    let entry_json = serde_json::to_value(&trail[0]).unwrap();
    assert_eq!(entry_json["action"], "stock_add");
    assert_eq!(entry_json["metadata"]["itemName"], "00 Flour");
    assert_eq!(entry_json["metadata"]["adjustmentAmount"], 2.5);
    assert_eq!(entry_json["metadata"]["action"], "add");
}
