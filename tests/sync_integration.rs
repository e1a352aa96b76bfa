//! Full-pipeline tests: scripted transport → connection manager →
//! dispatcher → view synchronizers, with the REST boundary faked
//! in-process.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::time::{sleep, timeout};

use stocklink::adapters::testing::{fixture_item, InMemoryInventoryApi, ScriptedTransport};
use stocklink::ports::InventoryApi;
use stocklink::sync::{ConnectionManager, ConnectionState, SubscriberRegistry};
use stocklink::views::{ItemsView, TransactionsView};

async fn eventually(description: &str, mut condition: impl FnMut() -> bool) {
    timeout(Duration::from_secs(2), async {
        while !condition() {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {description}"));
}

async fn wait_for_state(manager: &ConnectionManager, wanted: ConnectionState) {
    let mut rx = manager.watch_state();
    timeout(Duration::from_secs(2), async {
        loop {
            if *rx.borrow() == wanted {
                return;
            }
            rx.changed().await.expect("state channel closed");
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for state {wanted}"));
}

struct Harness {
    api: Arc<InMemoryInventoryApi>,
    registry: Arc<SubscriberRegistry>,
    transport: Arc<ScriptedTransport>,
    manager: ConnectionManager,
}

fn harness() -> Harness {
    let api = InMemoryInventoryApi::new();
    let registry = Arc::new(SubscriberRegistry::new());
    let transport = ScriptedTransport::new();
    let manager = ConnectionManager::new(
        transport.clone(),
        registry.clone(),
        "ws://localhost:8000/ws",
        Duration::from_millis(10),
    );
    Harness {
        api,
        registry,
        transport,
        manager,
    }
}

#[tokio::test]
async fn deleted_item_is_patched_locally_with_zero_network_calls() {
    let h = harness();
    h.api
        .set_items(vec![fixture_item(1, "A", 10), fixture_item(2, "B", 3)]);

    let items = ItemsView::new(h.api.clone() as Arc<dyn InventoryApi>);
    items.register(&h.registry);
    items.load().await.unwrap();
    let calls_after_load = h.api.item_list_calls();

    let session = h.transport.push_session();
    h.manager.ensure_connected();
    wait_for_state(&h.manager, ConnectionState::Connected).await;

    session.send_event("item_deleted", json!({"id": 1}));

    eventually("cache patch", || items.items().len() == 1).await;
    assert_eq!(items.items()[0].id, 2);
    assert_eq!(h.api.item_list_calls(), calls_after_load);
}

#[tokio::test]
async fn created_item_triggers_one_refetch_and_cache_matches_response() {
    let h = harness();
    let items = ItemsView::new(h.api.clone() as Arc<dyn InventoryApi>);
    items.register(&h.registry);

    let session = h.transport.push_session();
    h.manager.ensure_connected();
    wait_for_state(&h.manager, ConnectionState::Connected).await;

    h.api.set_items(vec![fixture_item(7, "NEW", 12)]);
    session.send_event("item_created", json!({"id": 7}));

    eventually("refetch applied", || !items.items().is_empty()).await;
    items.settled().await;
    assert_eq!(items.items(), vec![fixture_item(7, "NEW", 12)]);
    assert_eq!(h.api.item_list_calls(), 1);
}

#[tokio::test]
async fn malformed_frame_is_dropped_and_later_events_still_arrive() {
    let h = harness();
    h.api.set_items(vec![fixture_item(1, "A", 10)]);
    let items = ItemsView::new(h.api.clone() as Arc<dyn InventoryApi>);
    items.register(&h.registry);
    items.load().await.unwrap();

    let session = h.transport.push_session();
    h.manager.ensure_connected();
    wait_for_state(&h.manager, ConnectionState::Connected).await;

    session.send_text("{{{{ definitely not json");
    session.send_event("item_deleted", json!({"id": 1}));

    eventually("event after bad frame", || items.items().is_empty()).await;
    assert_eq!(h.manager.state(), ConnectionState::Connected);
}

#[tokio::test]
async fn transaction_event_refreshes_both_cached_lists() {
    let h = harness();
    let view = TransactionsView::new(h.api.clone() as Arc<dyn InventoryApi>);
    view.register(&h.registry);

    let session = h.transport.push_session();
    h.manager.ensure_connected();
    wait_for_state(&h.manager, ConnectionState::Connected).await;

    h.api.set_items(vec![fixture_item(1, "A", 9)]);
    session.send_event("transaction_created", json!({"id": 1, "item_id": 1}));

    eventually("transaction refetch", || {
        h.api.transaction_list_calls() == 1 && h.api.item_list_calls() == 1
    })
    .await;
    view.settled().await;
    assert_eq!(view.item_name(1), "Item A");
}

#[tokio::test]
async fn low_stock_alerts_accumulate_across_events_and_dismiss_in_place() {
    let h = harness();
    let items = ItemsView::new(h.api.clone() as Arc<dyn InventoryApi>);
    items.register(&h.registry);

    let session = h.transport.push_session();
    h.manager.ensure_connected();
    wait_for_state(&h.manager, ConnectionState::Connected).await;

    for (sku, quantity) in [("A", 2), ("B", 1), ("A", 2)] {
        session.send_event(
            "low_stock_alert",
            json!({"name": format!("Item {sku}"), "sku": sku, "quantity": quantity}),
        );
    }

    eventually("alerts accumulated", || items.alerts().len() == 3).await;

    let removed = items.dismiss_alert(0).unwrap();
    assert_eq!(removed.sku, "A");
    let skus: Vec<_> = items.alerts().into_iter().map(|a| a.sku).collect();
    assert_eq!(skus, vec!["B", "A"]);
}

#[tokio::test]
async fn connection_recovers_after_close_and_views_keep_syncing() {
    let h = harness();
    h.api.set_items(vec![fixture_item(1, "A", 10)]);
    let items = ItemsView::new(h.api.clone() as Arc<dyn InventoryApi>);
    items.register(&h.registry);
    items.load().await.unwrap();

    let session = h.transport.push_session();
    h.manager.ensure_connected();
    wait_for_state(&h.manager, ConnectionState::Connected).await;

    let next = h.transport.push_session();
    session.close();
    eventually("second connection", || {
        h.transport.attempts() == 2 && h.manager.state() == ConnectionState::Connected
    })
    .await;

    next.send_event("item_deleted", json!({"id": 1}));
    eventually("event after reconnect", || items.items().is_empty()).await;
}

#[tokio::test]
async fn detached_view_stops_receiving_events() {
    let h = harness();
    h.api.set_items(vec![fixture_item(1, "A", 10)]);
    let items = ItemsView::new(h.api.clone() as Arc<dyn InventoryApi>);
    items.register(&h.registry);
    items.load().await.unwrap();

    let session = h.transport.push_session();
    h.manager.ensure_connected();
    wait_for_state(&h.manager, ConnectionState::Connected).await;

    items.detach(&h.registry);
    session.send_event("item_deleted", json!({"id": 1}));

    // Give the pipeline time to (not) deliver.
    sleep(Duration::from_millis(50)).await;
    assert_eq!(items.items().len(), 1);
}

// A create/delete burst where the refetch for the create is still pending
// when the delete arrives. Refetches are not sequenced against patches
// (last completion wins), so only the eventual state after both settle is
// asserted; by then the server listing no longer contains the deleted id,
// so either completion order converges.
#[tokio::test]
async fn create_then_delete_burst_settles_without_deleted_item() {
    let h = harness();
    let items = ItemsView::new(h.api.clone() as Arc<dyn InventoryApi>);
    items.register(&h.registry);

    let session = h.transport.push_session();
    h.manager.ensure_connected();
    wait_for_state(&h.manager, ConnectionState::Connected).await;

    // Refetch for the create parks on the gate while the delete's local
    // patch goes through.
    h.api.set_items(vec![fixture_item(7, "G", 1)]);
    h.api.hold_responses();
    session.send_event("item_created", json!({"id": 7}));
    session.send_event("item_deleted", json!({"id": 7}));

    eventually("both events dispatched", || h.api.item_list_calls() == 1).await;

    // Server truth by the time the response is released: id 7 is gone.
    h.api.set_items(vec![]);
    h.api.release_responses();
    items.settled().await;

    assert!(items.items().iter().all(|item| item.id != 7));
}

#[tokio::test]
async fn create_then_delete_burst_with_refetch_completing_first() {
    let h = harness();
    let items = ItemsView::new(h.api.clone() as Arc<dyn InventoryApi>);
    items.register(&h.registry);

    let session = h.transport.push_session();
    h.manager.ensure_connected();
    wait_for_state(&h.manager, ConnectionState::Connected).await;

    h.api.set_items(vec![fixture_item(7, "G", 1)]);
    session.send_event("item_created", json!({"id": 7}));
    eventually("refetch landed", || !items.items().is_empty()).await;

    session.send_event("item_deleted", json!({"id": 7}));
    eventually("patch landed", || items.items().is_empty()).await;
    items.settled().await;

    assert!(items.items().iter().all(|item| item.id != 7));
}
