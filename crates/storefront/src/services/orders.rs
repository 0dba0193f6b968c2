//! Order history and order detail.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, instrument};

use fruity_core::{OrderId, OrderStatus, PaymentStatus};

use crate::api::{ApiClient, CreateOrderRequest, CreateOrderResponse, Order, OrderSummary};
use crate::error::{AppError, Result, add_breadcrumb};

#[derive(Debug, Default)]
struct OrderState {
    orders: Vec<OrderSummary>,
    current: Option<Order>,
}

/// Order store. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct OrderStore {
    api: ApiClient,
    state: Arc<RwLock<OrderState>>,
}

impl OrderStore {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(OrderState::default())),
        }
    }

    pub async fn orders(&self) -> Vec<OrderSummary> {
        self.state.read().await.orders.clone()
    }

    /// Order last loaded with [`Self::load_order_detail`].
    pub async fn current(&self) -> Option<Order> {
        self.state.read().await.current.clone()
    }

    /// Fetch the customer's orders.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotAuthenticated` without a token, or an API error.
    #[instrument(skip(self))]
    pub async fn load_my_orders(&self) -> Result<Vec<OrderSummary>> {
        self.require_token()?;
        let orders = self.api.my_orders().await?;
        self.state.write().await.orders.clone_from(&orders);
        Ok(orders)
    }

    /// Fetch one order with items, history and shipment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotAuthenticated` without a token, or an API error.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn load_order_detail(&self, id: &OrderId) -> Result<Order> {
        self.require_token()?;
        let order = self.api.order_detail(id).await?;
        self.state.write().await.current = Some(order.clone());
        Ok(order)
    }

    /// Submit an order, then refresh the order list.
    ///
    /// A failed refresh does not fail the submission.
    ///
    /// # Errors
    ///
    /// Returns an API error if the backend rejects the order.
    #[instrument(skip(self, request))]
    pub async fn place_order(&self, request: &CreateOrderRequest) -> Result<CreateOrderResponse> {
        self.require_token()?;
        let response = self.api.create_order(request).await?;

        if let Some(id) = response.order_id() {
            info!(order_id = %id, payment_method = %request.payment_method, "Order placed");
            let order_id = id.to_string();
            add_breadcrumb("order", "Order placed", Some(&[("order_id", order_id.as_str())]));
        }

        if let Err(e) = self.load_my_orders().await {
            tracing::warn!(error = %e, "Order list refresh failed after placing order");
        }
        Ok(response)
    }

    /// Record a payment outcome, then reload the order detail.
    ///
    /// # Errors
    ///
    /// Returns an API error if the update or the reload fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn update_payment_status(&self, id: &OrderId, status: PaymentStatus) -> Result<Order> {
        self.require_token()?;
        self.api.update_payment_status(id, status).await?;
        self.load_order_detail(id).await
    }

    /// Loaded orders with the given status.
    pub async fn filter_by_status(&self, status: OrderStatus) -> Vec<OrderSummary> {
        filter_by_status(&self.state.read().await.orders, status)
    }

    /// Drop local state (logout).
    pub async fn reset(&self) {
        *self.state.write().await = OrderState::default();
    }

    fn require_token(&self) -> Result<()> {
        if self.api.has_token() {
            Ok(())
        } else {
            Err(AppError::NotAuthenticated)
        }
    }
}

#[must_use]
pub fn filter_by_status(orders: &[OrderSummary], status: OrderStatus) -> Vec<OrderSummary> {
    orders.iter().filter(|o| o.status == status).cloned().collect()
}
