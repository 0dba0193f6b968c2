//! Order history and status notifications against the mock backend.
//!
//! Run with: cargo test -p fruity-integration-tests --test orders

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use fruity_core::{OrderId, OrderStatus, PaymentStatus};
use fruity_integration_tests::{EMAIL, MockBackend, PASSWORD};
use fruity_storefront::services::notifications::NotificationSink;
use fruity_storefront::services::order_watcher::{self, OrderWatcher};
use secrecy::SecretString;

/// Keeps every message it is given.
#[derive(Default)]
struct CollectingSink {
    messages: Mutex<Vec<String>>,
}

impl CollectingSink {
    fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl NotificationSink for CollectingSink {
    fn notify(&self, message: String) {
        self.messages.lock().unwrap().push(message);
    }
}

#[tokio::test]
async fn test_order_list_and_detail() {
    let backend = MockBackend::spawn().await;
    backend.add_order(501, "pending");
    backend.add_order(502, "Vận chuyển");
    let storefront = backend.logged_in().await;
    let orders = storefront.orders();

    let list = orders.load_my_orders().await.unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[1].status, OrderStatus::Shipped);
    assert_eq!(list[0].payment_status, PaymentStatus::Unpaid);

    let shipped = orders.filter_by_status(OrderStatus::Shipped).await;
    assert_eq!(shipped.len(), 1);
    assert_eq!(shipped[0].id, OrderId::from(502));

    let detail = orders.load_order_detail(&OrderId::from(501)).await.unwrap();
    assert_eq!(detail.order_number.as_deref(), Some("FF501"));
    assert_eq!(detail.history.len(), 1);
    assert_eq!(detail.shipment.unwrap().carrier_code.as_deref(), Some("ghn"));
    assert_eq!(orders.current().await.unwrap().id, OrderId::from(501));
}

#[tokio::test]
async fn test_update_payment_status_reloads_order() {
    let backend = MockBackend::spawn().await;
    backend.add_order(501, "pending");
    let storefront = backend.logged_in().await;

    let order = storefront
        .orders()
        .update_payment_status(&OrderId::from(501), PaymentStatus::Paid)
        .await
        .unwrap();

    assert_eq!(order.payment_status, PaymentStatus::Paid);
    assert_eq!(backend.payment_status(501).as_deref(), Some("paid"));
}

#[tokio::test]
async fn test_watcher_notifies_each_transition_once() {
    let backend = MockBackend::spawn().await;
    backend.add_order(501, "pending");
    backend.add_order(502, "pending");
    let storefront = backend.logged_in().await;
    let sink = CollectingSink::default();
    let mut watcher = OrderWatcher::new();

    // First poll only records the baseline
    assert_eq!(order_watcher::poll_once(storefront.api(), &mut watcher, &sink).await, 0);
    assert!(watcher.has_baseline());

    backend.set_order_status(501, "shipped");
    assert_eq!(order_watcher::poll_once(storefront.api(), &mut watcher, &sink).await, 1);

    // Unchanged snapshot raises nothing
    assert_eq!(order_watcher::poll_once(storefront.api(), &mut watcher, &sink).await, 0);

    assert_eq!(
        sink.messages(),
        vec!["Đơn hàng #501 đã chuyển sang: Vận chuyển".to_string()]
    );
}

#[tokio::test]
async fn test_watcher_keeps_snapshot_across_failed_poll() {
    let backend = MockBackend::spawn().await;
    backend.add_order(501, "pending");
    let storefront = backend.logged_in().await;
    let sink = CollectingSink::default();
    let mut watcher = OrderWatcher::new();

    order_watcher::poll_once(storefront.api(), &mut watcher, &sink).await;

    backend.fail_order_list(true);
    backend.set_order_status(501, "completed");
    assert_eq!(order_watcher::poll_once(storefront.api(), &mut watcher, &sink).await, 0);

    backend.fail_order_list(false);
    assert_eq!(order_watcher::poll_once(storefront.api(), &mut watcher, &sink).await, 1);
    assert_eq!(sink.messages(), vec!["Đơn hàng #501 đã chuyển sang: Đã nhận".to_string()]);
}

#[tokio::test]
async fn test_unrecognised_status_does_not_break_watcher() {
    let backend = MockBackend::spawn().await;
    backend.add_order(501, "pending");
    backend.add_order(502, "returned");
    let storefront = backend.logged_in().await;
    let sink = CollectingSink::default();
    let mut watcher = OrderWatcher::new();

    let list = storefront.orders().load_my_orders().await.unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[1].status, OrderStatus::Pending);

    order_watcher::poll_once(storefront.api(), &mut watcher, &sink).await;
    backend.set_order_status(501, "confirmed");
    assert_eq!(order_watcher::poll_once(storefront.api(), &mut watcher, &sink).await, 1);
    assert_eq!(sink.messages(), vec!["Đơn hàng #501 đã chuyển sang: Xác nhận".to_string()]);
}

#[tokio::test]
async fn test_watcher_idle_without_login() {
    let backend = MockBackend::spawn().await;
    backend.add_order(501, "pending");
    let storefront = backend.storefront();
    let sink = CollectingSink::default();
    let mut watcher = OrderWatcher::new();

    assert_eq!(order_watcher::poll_once(storefront.api(), &mut watcher, &sink).await, 0);
    assert_eq!(backend.order_list_calls(), 0);
    assert!(!watcher.has_baseline());
}

#[tokio::test]
async fn test_spawned_watcher_feeds_sink_and_stops() {
    let backend = MockBackend::spawn().await;
    backend.add_order(501, "pending");
    let storefront = backend.logged_in().await;
    let sink = Arc::new(CollectingSink::default());

    let handle = order_watcher::spawn(
        storefront.api().clone(),
        Arc::clone(&sink) as Arc<dyn NotificationSink>,
        Duration::from_millis(20),
    );

    // Wait for the baseline poll
    while backend.order_list_calls() == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    backend.set_order_status(501, "confirmed");

    for _ in 0..200 {
        if !sink.messages().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    handle.stop().await;

    assert_eq!(sink.messages(), vec!["Đơn hàng #501 đã chuyển sang: Xác nhận".to_string()]);

    let calls = backend.order_list_calls();
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(backend.order_list_calls(), calls);
}

#[tokio::test]
async fn test_storefront_watcher_writes_notification_center() {
    let backend = MockBackend::spawn().await;
    backend.add_order(501, "pending");
    let mut config = backend.config();
    config.order_poll_interval = Duration::from_millis(20);
    let storefront = backend.storefront_with(config);
    storefront
        .auth()
        .login(EMAIL, &SecretString::from(PASSWORD))
        .await
        .unwrap();

    let handle = storefront.start_order_watcher();
    while backend.order_list_calls() == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    backend.set_order_status(501, "cancelled");

    for _ in 0..200 {
        if storefront.notifications().unread_count() > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    handle.stop().await;

    let list = storefront.notifications().list();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].message, "Đơn hàng #501 đã chuyển sang: Đã hủy");
    assert!(!list[0].read);
}
