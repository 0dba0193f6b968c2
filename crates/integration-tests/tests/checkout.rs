//! Checkout flow against the mock backend.
//!
//! Run with: cargo test -p fruity-integration-tests --test checkout

#![allow(clippy::unwrap_used)]

use fruity_core::{PaymentMethod, ProductId, VariantId};
use fruity_integration_tests::MockBackend;
use fruity_storefront::api::{Address, AddressInput, CartItem};
use fruity_storefront::services::checkout::{CheckoutOutcome, summary};
use fruity_storefront::{AppError, Storefront};
use rust_decimal::Decimal;
use serde_json::json;

/// Logged-in storefront with one address and two mangoes in the cart.
async fn ready_to_checkout(backend: &MockBackend) -> (Storefront, Address, Vec<CartItem>) {
    let storefront = backend.logged_in().await;
    let list = storefront
        .addresses()
        .add(&AddressInput {
            name: "Nguyễn Thị Lan".to_string(),
            phone: "0901234567".to_string(),
            address: "1 Lê Lợi".to_string(),
            province_code: "79".to_string(),
            district_code: "1442".to_string(),
            ward_code: "20109".to_string(),
            is_default: true,
        })
        .await
        .unwrap();
    let items = storefront
        .cart()
        .add_item(ProductId::new(1), Some(VariantId::new(11)), 2, None)
        .await
        .unwrap();
    (storefront, list[0].clone(), items)
}

#[tokio::test]
async fn test_quote_uses_cheapest_option() {
    let backend = MockBackend::spawn().await;
    let (storefront, address, items) = ready_to_checkout(&backend).await;

    let quote = storefront.checkout().quote_shipping(Some(&address), &items).await;

    assert_eq!(quote.shipping_fee, Decimal::new(22_000, 0));
    assert_eq!(quote.cod_fee, Decimal::new(5_000, 0));
    assert_eq!(quote.option.as_ref().unwrap().name.as_deref(), Some("Tiết kiệm"));

    let requests = backend.shipping_requests();
    let request = &requests[0];
    assert_eq!(request["carrierCode"], "ghn");
    assert_eq!(request["to_district_id"], 1442);
    assert_eq!(request["to_ward_code"], "20109");
    assert_eq!(request["items"][0]["quantity"], 2);

    let totals = summary(&items, &quote);
    assert_eq!(totals.items_total, Decimal::new(170_000, 0));
    assert_eq!(totals.total, Decimal::new(197_000, 0));
}

#[tokio::test]
async fn test_quote_without_address_is_zero() {
    let backend = MockBackend::spawn().await;
    let (storefront, _, items) = ready_to_checkout(&backend).await;

    let quote = storefront.checkout().quote_shipping(None, &items).await;

    assert!(quote.option.is_none());
    assert_eq!(quote.shipping_fee, Decimal::ZERO);
    assert!(backend.shipping_requests().is_empty());
}

#[tokio::test]
async fn test_cod_order_clears_cart() {
    let backend = MockBackend::spawn().await;
    let (storefront, address, items) = ready_to_checkout(&backend).await;
    let checkout = storefront.checkout();

    let quote = checkout.quote_shipping(Some(&address), &items).await;
    let outcome = checkout
        .place_order(Some(&address), &items, &quote, PaymentMethod::Cod, None)
        .await
        .unwrap();

    assert!(matches!(outcome, CheckoutOutcome::Completed { .. }));
    assert!(storefront.cart().items().await.is_empty());
    assert!(backend.cart().is_empty());

    let requests = backend.order_requests();
    let request = &requests[0];
    assert_eq!(request["paymentMethod"], "cod");
    assert_eq!(request["addressId"], json!(address.id.as_i64()));
    assert_eq!(request["shippingOption"]["service_type_id"], 1);
    assert_eq!(request["notes"], "Vui lòng gọi trước khi giao");

    // Placing refreshes the order list
    let orders = storefront.orders().orders().await;
    assert_eq!(orders.len(), 1);
    assert_eq!(&orders[0].id, outcome.order_id());
    assert_eq!(orders[0].total_amount, Decimal::new(192_000, 0));
}

#[tokio::test]
async fn test_momo_order_redirects_to_gateway() {
    let backend = MockBackend::spawn().await;
    let (storefront, address, items) = ready_to_checkout(&backend).await;
    let checkout = storefront.checkout();

    let quote = checkout.quote_shipping(Some(&address), &items).await;
    let outcome = checkout
        .place_order(
            Some(&address),
            &items,
            &quote,
            PaymentMethod::Momo,
            Some("Giao giờ hành chính"),
        )
        .await
        .unwrap();

    let CheckoutOutcome::Redirect { order_id, pay_url } = outcome else {
        panic!("expected a payment redirect");
    };
    assert_eq!(pay_url, format!("https://test-payment.momo.vn/pay/{order_id}"));
    assert!(backend.cart().is_empty());
    assert_eq!(backend.order_requests()[0]["notes"], "Giao giờ hành chính");
}

#[tokio::test]
async fn test_order_needs_shipping_option() {
    let backend = MockBackend::spawn().await;
    backend.set_shipping_options(json!({ "data": [] }));
    let (storefront, address, items) = ready_to_checkout(&backend).await;
    let checkout = storefront.checkout();

    let quote = checkout.quote_shipping(Some(&address), &items).await;
    let result = checkout
        .place_order(Some(&address), &items, &quote, PaymentMethod::Cod, None)
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(backend.order_requests().is_empty());
    assert_eq!(backend.cart().len(), 1);
}

#[tokio::test]
async fn test_order_needs_address_and_items() {
    let backend = MockBackend::spawn().await;
    let (storefront, address, items) = ready_to_checkout(&backend).await;
    let checkout = storefront.checkout();
    let quote = checkout.quote_shipping(Some(&address), &items).await;

    let no_address = checkout
        .place_order(None, &items, &quote, PaymentMethod::Cod, None)
        .await;
    assert!(matches!(no_address, Err(AppError::Validation(_))));

    let no_items = checkout
        .place_order(Some(&address), &[], &quote, PaymentMethod::Cod, None)
        .await;
    assert!(matches!(no_items, Err(AppError::Validation(_))));

    assert!(backend.order_requests().is_empty());
}
