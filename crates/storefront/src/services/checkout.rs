//! Checkout: shipping quote, order summary and order submission.
//!
//! Orders are submitted once; there is no idempotency key and no retry.

use rust_decimal::Decimal;
use tracing::{instrument, warn};

use fruity_core::{OrderId, PaymentMethod};

use crate::api::{
    Address, ApiClient, CartItem, CreateOrderRequest, ShippingItem, ShippingOption,
    ShippingQuoteRequest, ShippingSelection, cheapest_option,
};
use crate::config::CheckoutConfig;
use crate::error::{AppError, Result};
use crate::services::cart::CartStore;
use crate::services::orders::OrderStore;

/// Shipping quote for the current cart and address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShippingQuote {
    /// Cheapest carrier service, if any was offered.
    pub option: Option<ShippingOption>,
    pub shipping_fee: Decimal,
    pub cod_fee: Decimal,
}

impl ShippingQuote {
    fn from_options(options: &[ShippingOption]) -> Self {
        cheapest_option(options).map_or_else(Self::default, |o| Self {
            option: Some(o.clone()),
            shipping_fee: o.fee,
            cod_fee: o.cod_fee,
        })
    }
}

/// Amounts shown before placing an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutSummary {
    pub items_total: Decimal,
    pub shipping_fee: Decimal,
    pub cod_fee: Decimal,
    pub total: Decimal,
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// Cash on delivery: the order is placed.
    Completed { order_id: OrderId },
    /// Online payment: continue at the gateway.
    Redirect { order_id: OrderId, pay_url: String },
}

impl CheckoutOutcome {
    #[must_use]
    pub const fn order_id(&self) -> &OrderId {
        match self {
            Self::Completed { order_id } | Self::Redirect { order_id, .. } => order_id,
        }
    }
}

/// Checkout flow over the cart and order stores.
#[derive(Clone)]
pub struct CheckoutService {
    api: ApiClient,
    cart: CartStore,
    orders: OrderStore,
    config: CheckoutConfig,
}

impl CheckoutService {
    #[must_use]
    pub const fn new(
        api: ApiClient,
        cart: CartStore,
        orders: OrderStore,
        config: CheckoutConfig,
    ) -> Self {
        Self {
            api,
            cart,
            orders,
            config,
        }
    }

    /// Quote shipping for `items` delivered to `address`.
    ///
    /// Without a usable destination or with an empty cart there is no quote.
    /// Carrier errors are logged and yield a zero quote.
    #[instrument(skip_all, fields(lines = items.len()))]
    pub async fn quote_shipping(&self, address: Option<&Address>, items: &[CartItem]) -> ShippingQuote {
        let Some(request) = self.quote_request(address, items) else {
            return ShippingQuote::default();
        };

        match self.api.shipping_options(&request).await {
            Ok(options) => ShippingQuote::from_options(&options),
            Err(e) => {
                warn!(error = %e, "Shipping quote failed");
                ShippingQuote::default()
            }
        }
    }

    /// Payload for a shipping quote, if one can be requested.
    #[must_use]
    pub fn quote_request(
        &self,
        address: Option<&Address>,
        items: &[CartItem],
    ) -> Option<ShippingQuoteRequest> {
        let (district, ward) = address?.shipping_destination()?;
        if items.is_empty() {
            return None;
        }

        Some(ShippingQuoteRequest {
            carrier_code: self.config.carrier_code.clone(),
            to_district_id: district,
            to_ward_code: ward.to_string(),
            items: items
                .iter()
                .map(|i| ShippingItem {
                    quantity: i.quantity,
                    weight: self.config.default_item_weight_grams,
                    price: i.product.price,
                })
                .collect(),
        })
    }

    /// Place the order for the current cart.
    ///
    /// The cart is cleared once the backend accepts the order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` when the address, cart lines or
    /// shipping option are missing, or when an online payment comes back
    /// without a payment URL. Returns an API error if submission fails.
    #[instrument(skip(self, address, items, quote), fields(payment_method = %payment_method))]
    pub async fn place_order(
        &self,
        address: Option<&Address>,
        items: &[CartItem],
        quote: &ShippingQuote,
        payment_method: PaymentMethod,
        notes: Option<&str>,
    ) -> Result<CheckoutOutcome> {
        let address =
            address.ok_or_else(|| AppError::Validation("Vui lòng chọn địa chỉ giao hàng.".to_string()))?;
        if items.is_empty() {
            return Err(AppError::Validation("Giỏ hàng đang trống.".to_string()));
        }
        let option = quote
            .option
            .as_ref()
            .ok_or_else(|| AppError::Validation("Chưa có phương thức vận chuyển.".to_string()))?;

        let request = CreateOrderRequest {
            address_id: address.id,
            shipping_option: ShippingSelection::from(option),
            payment_method,
            notes: notes
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map_or_else(|| self.config.default_order_note.clone(), str::to_string),
        };

        let response = self.orders.place_order(&request).await?;
        let order_id = response
            .order_id()
            .cloned()
            .ok_or_else(|| AppError::Internal("order response did not include an id".to_string()))?;

        let outcome = if payment_method.requires_redirect() {
            let pay_url = response.pay_url().ok_or_else(|| {
                AppError::Validation("Không nhận được đường dẫn thanh toán MoMo.".to_string())
            })?;
            CheckoutOutcome::Redirect {
                order_id,
                pay_url: pay_url.to_string(),
            }
        } else {
            CheckoutOutcome::Completed { order_id }
        };

        if let Err(e) = self.cart.clear().await {
            warn!(error = %e, "Cart clear failed after placing order");
        }
        Ok(outcome)
    }
}

/// Items total plus shipping and COD fees.
#[must_use]
pub fn summary(items: &[CartItem], quote: &ShippingQuote) -> CheckoutSummary {
    let items_total: Decimal = items.iter().map(CartItem::line_total).sum();
    CheckoutSummary {
        items_total,
        shipping_fee: quote.shipping_fee,
        cod_fee: quote.cod_fee,
        total: items_total + quote.shipping_fee + quote.cod_fee,
    }
}

// =============================================================================
// Payment Return
// =============================================================================

/// Outcome reported by the payment gateway on its return URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReturn {
    pub order_id: Option<OrderId>,
    pub success: bool,
    pub message: Option<String>,
}

impl PaymentReturn {
    /// Result code reported for a successful payment.
    pub const SUCCESS_CODE: &'static str = "0";

    /// Read the `orderId`, `resultCode` and `message` query values.
    #[must_use]
    pub fn from_query(order_id: Option<&str>, result_code: Option<&str>, message: Option<&str>) -> Self {
        Self {
            order_id: order_id
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(OrderId::from),
            success: result_code.map(str::trim) == Some(Self::SUCCESS_CODE),
            message: message
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string),
        }
    }

    /// Text to show the customer.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        if self.success {
            "Thanh toán MoMo thành công!"
        } else {
            "Thanh toán thất bại hoặc bị hủy."
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::ProductInfo;
    use fruity_core::{CartItemId, ProductId, VariantId};

    fn item(price: i64, quantity: u32) -> CartItem {
        CartItem {
            id: CartItemId::new(1),
            product_id: ProductId::new(1),
            variant_id: Some(VariantId::new(1)),
            quantity,
            product: ProductInfo {
                price: Decimal::new(price, 0),
                ..ProductInfo::default()
            },
            provisional: false,
        }
    }

    fn option(fee: i64, cod_fee: i64) -> ShippingOption {
        ShippingOption {
            fee: Decimal::new(fee, 0),
            cod_fee: Decimal::new(cod_fee, 0),
            service_id: None,
            service_type_id: None,
            name: None,
        }
    }

    #[test]
    fn test_quote_picks_cheapest() {
        let quote = ShippingQuote::from_options(&[option(30_000, 0), option(22_000, 5_000)]);
        assert_eq!(quote.shipping_fee, Decimal::new(22_000, 0));
        assert_eq!(quote.cod_fee, Decimal::new(5_000, 0));

        let none = ShippingQuote::from_options(&[]);
        assert!(none.option.is_none());
        assert_eq!(none.shipping_fee, Decimal::ZERO);
    }

    #[test]
    fn test_summary_adds_fees() {
        let quote = ShippingQuote::from_options(&[option(22_000, 5_000)]);
        let summary = summary(&[item(30_000, 2), item(15_000, 1)], &quote);
        assert_eq!(summary.items_total, Decimal::new(75_000, 0));
        assert_eq!(summary.total, Decimal::new(102_000, 0));
    }

    #[test]
    fn test_payment_return() {
        let ok = PaymentReturn::from_query(Some("42"), Some("0"), None);
        assert!(ok.success);
        assert_eq!(ok.order_id, Some(OrderId::from("42")));

        let cancelled = PaymentReturn::from_query(Some("42"), Some("1006"), Some("Giao dịch bị từ chối"));
        assert!(!cancelled.success);
        assert_eq!(cancelled.user_message(), "Thanh toán thất bại hoặc bị hủy.");
        assert_eq!(cancelled.message.as_deref(), Some("Giao dịch bị từ chối"));

        let missing = PaymentReturn::from_query(None, None, None);
        assert!(!missing.success);
        assert!(missing.order_id.is_none());
    }
}
