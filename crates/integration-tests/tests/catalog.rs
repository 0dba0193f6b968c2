//! Catalog reads against the mock backend.
//!
//! Run with: cargo test -p fruity-integration-tests --test catalog

#![allow(clippy::unwrap_used)]

use fruity_core::{CategoryId, ProductId};
use fruity_integration_tests::MockBackend;
use fruity_storefront::AppError;
use fruity_storefront::api::ProductFilters;
use fruity_storefront::services::catalog::ListingState;
use rust_decimal::Decimal;

#[tokio::test]
async fn test_products_tolerate_mixed_field_shapes() {
    let backend = MockBackend::spawn().await;
    let storefront = backend.storefront();

    let page = storefront
        .catalog()
        .products(&ProductFilters::default())
        .await
        .unwrap();

    assert_eq!(page.data.len(), 3);
    assert_eq!(page.data[1].id, ProductId::new(2));
    assert_eq!(page.data[1].price, Decimal::new(60_000, 0));
    assert!(page.data[1].images.is_none());
    assert!(page.data[2].images.is_none());
    assert_eq!(page.pagination.unwrap().total_items, 3);
}

#[tokio::test]
async fn test_product_by_slug() {
    let backend = MockBackend::spawn().await;
    let storefront = backend.storefront();
    let catalog = storefront.catalog();

    let product = catalog.product_by_slug("buoi-da-xanh").await.unwrap();
    assert_eq!(product.name, "Bưởi da xanh");

    let missing = catalog.product_by_slug("mit-thai").await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_related_excludes_current_product() {
    let backend = MockBackend::spawn().await;
    let storefront = backend.storefront();
    let catalog = storefront.catalog();

    let related = catalog.related("nhiet-doi", ProductId::new(1)).await.unwrap();
    assert_eq!(related.len(), 1);
    assert_eq!(related[0].slug, "buoi-da-xanh");

    assert!(catalog.related("khong-co", ProductId::new(1)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_featured_variants_and_reviews() {
    let backend = MockBackend::spawn().await;
    let storefront = backend.storefront();
    let catalog = storefront.catalog();

    let featured = catalog.featured().await.unwrap();
    assert_eq!(featured.len(), 2);

    let variants = catalog.variants(ProductId::new(1)).await.unwrap();
    assert_eq!(variants.len(), 2);
    assert_eq!(variants[1].price, Decimal::new(160_000, 0));
    assert_eq!(variants[0].images, vec!["xoai-1kg.jpg".to_string()]);

    let reviews = catalog.reviews(ProductId::new(1)).await.unwrap();
    assert_eq!(reviews[0].rating, 5);
    assert!(catalog.reviews(ProductId::new(2)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_category_tree() {
    let backend = MockBackend::spawn().await;
    let storefront = backend.storefront();

    let tree = storefront.catalog().categories().await.unwrap();

    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].children.len(), 2);
    assert_eq!(tree[0].children[0].parent_id, Some(CategoryId::new(1)));
}

#[tokio::test]
async fn test_listing_publishes_latest_filters() {
    let backend = MockBackend::spawn().await;
    let storefront = backend.storefront();
    let listing = storefront.product_listing();
    assert!(matches!(listing.state(), ListingState::Idle));

    listing.set_filters(ProductFilters {
        search: Some("xoài".to_string()),
        ..ProductFilters::default()
    });
    listing.set_filters(ProductFilters {
        category_id: Some(CategoryId::new(3)),
        ..ProductFilters::default()
    });

    let page = listing.wait_loaded().await.unwrap();
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].slug, "sau-rieng-ri6");

    let ListingState::Loaded { filters, .. } = listing.state() else {
        panic!("expected loaded listing");
    };
    assert_eq!(filters.category_id, Some(CategoryId::new(3)));
}

#[tokio::test]
async fn test_listing_failure_keeps_server_error() {
    let backend = MockBackend::spawn().await;
    backend.fail_product_list(true);
    let storefront = backend.storefront();
    let listing = storefront.product_listing();

    listing.set_filters(ProductFilters::default());
    let err = listing.wait_loaded().await.unwrap_err();

    assert!(matches!(err, AppError::Shared(_)));
    assert!(err.is_reportable());
    assert_eq!(err.user_message(), "Lỗi máy chủ");
    let ListingState::Failed { error, .. } = listing.state() else {
        panic!("expected failed listing");
    };
    assert!(error.is_reportable());
}
