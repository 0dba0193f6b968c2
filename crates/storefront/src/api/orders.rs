//! Order endpoints. Never cached.

use reqwest::Method;
use serde::Serialize;
use tracing::instrument;

use fruity_core::{OrderId, PaymentStatus};

use super::conversions::extract_list;
use super::{ApiClient, ApiError, CreateOrderRequest, CreateOrderResponse, MessageResponse, Order, OrderSummary};

#[derive(Serialize)]
struct PaymentStatusBody {
    status: PaymentStatus,
}

impl ApiClient {
    /// Orders of the current customer, newest first as the backend sends them.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn my_orders(&self) -> Result<Vec<OrderSummary>, ApiError> {
        let url = self.endpoint("orders/my-orders")?;
        let body: serde_json::Value = self
            .send_json(
                self.request(Method::GET, url),
                "Không thể lấy danh sách đơn hàng",
            )
            .await?;
        Ok(extract_list(body, &["orders", "data"])?)
    }

    /// Full detail of one order.
    ///
    /// # Errors
    ///
    /// Returns an error if the order does not exist or the request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn order_detail(&self, id: &OrderId) -> Result<Order, ApiError> {
        let url = self.endpoint(&format!("orders/my-orders/{id}"))?;
        let body: serde_json::Value = self
            .send_json(
                self.request(Method::GET, url),
                "Không thể lấy chi tiết đơn hàng",
            )
            .await?;

        // Some deployments wrap the order as `{ order: {...} }`.
        let body = match body {
            serde_json::Value::Object(mut map) if map.contains_key("order") && !map.contains_key("id") => {
                map.remove("order").unwrap_or_default()
            }
            other => other,
        };
        Ok(serde_json::from_value(body)?)
    }

    /// Submit a new order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the payload or the request fails.
    #[instrument(
        skip(self, request),
        fields(address_id = %request.address_id, payment_method = %request.payment_method)
    )]
    pub async fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<CreateOrderResponse, ApiError> {
        let url = self.endpoint("orders")?;
        self.send_json(
            self.request(Method::POST, url).json(request),
            "Dữ liệu đặt hàng không hợp lệ. Vui lòng kiểm tra addressId, shippingOption, paymentMethod.",
        )
        .await
    }

    /// Report the outcome of an online payment.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(order_id = %id, status = ?status))]
    pub async fn update_payment_status(
        &self,
        id: &OrderId,
        status: PaymentStatus,
    ) -> Result<MessageResponse, ApiError> {
        let url = self.endpoint(&format!("orders/{id}/payment-status"))?;
        let body = self
            .send(
                self.request(Method::POST, url).json(&PaymentStatusBody { status }),
                "Không thể cập nhật trạng thái thanh toán",
            )
            .await?;
        Ok(serde_json::from_str(&body).unwrap_or_default())
    }
}
