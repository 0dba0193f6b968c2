//! Order status polling.
//!
//! Polls the customer's orders on a fixed interval, compares each poll with
//! the previous snapshot and raises one notification per status transition.
//! Transitions are remembered as `(order id, new status)` so a change is
//! announced exactly once even if later polls keep reporting it.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use fruity_core::{OrderId, OrderStatus};

use crate::api::{ApiClient, OrderSummary};
use crate::services::notifications::NotificationSink;

/// Snapshot diffing state. Pure; the polling loop lives in [`spawn`].
#[derive(Debug, Default)]
pub struct OrderWatcher {
    previous: HashMap<OrderId, OrderStatus>,
    seen: HashSet<(OrderId, OrderStatus)>,
}

impl OrderWatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a poll result and return the messages to raise.
    ///
    /// With no previous snapshot the poll only sets the baseline.
    pub fn observe(&mut self, orders: &[OrderSummary]) -> Vec<String> {
        let mut messages = Vec::new();

        if !self.previous.is_empty() {
            for order in orders {
                let Some(old) = self.previous.get(&order.id) else {
                    continue;
                };
                if *old == order.status {
                    continue;
                }
                if self.seen.insert((order.id.clone(), order.status)) {
                    messages.push(transition_message(&order.id, order.status));
                }
            }
        }

        self.previous = orders.iter().map(|o| (o.id.clone(), o.status)).collect();
        messages
    }

    /// Whether a baseline has been recorded.
    #[must_use]
    pub fn has_baseline(&self) -> bool {
        !self.previous.is_empty()
    }
}

/// Customer-facing text for a status change.
#[must_use]
pub fn transition_message(id: &OrderId, status: OrderStatus) -> String {
    format!("Đơn hàng #{id} đã chuyển sang: {}", status.label())
}

/// Handle to a running watcher task.
pub struct WatcherHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl WatcherHandle {
    /// Stop polling and wait for the task to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            warn!(error = %e, "Order watcher task ended abnormally");
        }
    }
}

/// Start polling `GET /orders/my-orders` every `interval`.
///
/// Poll errors are logged and the previous snapshot is kept; there is no
/// backoff. Polls are skipped while the client has no token.
pub fn spawn(api: ApiClient, sink: Arc<dyn NotificationSink>, interval: Duration) -> WatcherHandle {
    let (shutdown, mut shutdown_rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        info!(interval_secs = interval.as_secs(), "Order watcher started");
        let mut watcher = OrderWatcher::new();
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    poll_once(&api, &mut watcher, sink.as_ref()).await;
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }
        info!("Order watcher stopped");
    });

    WatcherHandle { shutdown, task }
}

/// One poll cycle. Returns the number of notifications raised.
pub async fn poll_once(api: &ApiClient, watcher: &mut OrderWatcher, sink: &dyn NotificationSink) -> usize {
    if !api.has_token() {
        debug!("Order watcher idle: not logged in");
        return 0;
    }

    match api.my_orders().await {
        Ok(orders) => {
            let messages = watcher.observe(&orders);
            let count = messages.len();
            for message in messages {
                info!(%message, "Order status changed");
                sink.notify(message);
            }
            count
        }
        Err(e) => {
            warn!(error = %e, "Order status poll failed");
            0
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn order(id: i64, status: OrderStatus) -> OrderSummary {
        OrderSummary {
            id: OrderId::from(id),
            order_number: None,
            status,
            payment_method: None,
            payment_status: fruity_core::PaymentStatus::Unpaid,
            total_amount: Decimal::ZERO,
            order_date: None,
        }
    }

    #[test]
    fn test_first_poll_sets_baseline() {
        let mut watcher = OrderWatcher::new();
        assert!(watcher.observe(&[order(1, OrderStatus::Pending)]).is_empty());
        assert!(watcher.has_baseline());
    }

    #[test]
    fn test_transition_notifies_once() {
        let mut watcher = OrderWatcher::new();
        watcher.observe(&[order(1, OrderStatus::Pending), order(2, OrderStatus::Pending)]);

        let messages = watcher.observe(&[order(1, OrderStatus::Shipped), order(2, OrderStatus::Pending)]);
        assert_eq!(messages, vec!["Đơn hàng #1 đã chuyển sang: Vận chuyển".to_string()]);

        assert!(
            watcher
                .observe(&[order(1, OrderStatus::Shipped), order(2, OrderStatus::Pending)])
                .is_empty()
        );

        let messages = watcher.observe(&[order(1, OrderStatus::Completed), order(2, OrderStatus::Pending)]);
        assert_eq!(messages.len(), 1);
        assert!(messages[0].ends_with("Đã nhận"));
    }

    #[test]
    fn test_new_orders_do_not_notify() {
        let mut watcher = OrderWatcher::new();
        watcher.observe(&[order(1, OrderStatus::Pending)]);
        assert!(
            watcher
                .observe(&[order(1, OrderStatus::Pending), order(2, OrderStatus::Confirmed)])
                .is_empty()
        );
    }

    #[test]
    fn test_seen_transition_is_not_repeated_after_flapping() {
        let mut watcher = OrderWatcher::new();
        watcher.observe(&[order(1, OrderStatus::Pending)]);
        assert_eq!(watcher.observe(&[order(1, OrderStatus::Confirmed)]).len(), 1);
        assert_eq!(watcher.observe(&[order(1, OrderStatus::Processing)]).len(), 1);
        // Back to a status already announced.
        assert!(watcher.observe(&[order(1, OrderStatus::Confirmed)]).is_empty());
    }
}
