//! Conversion of raw backend payloads into domain types.

use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use fruity_core::{CartItemId, ProductId, VariantId};

use super::types::{CartItem, ProductInfo, decimal_or_zero, image_list};

/// Name shown for a cart line whose product was not embedded.
pub const UNKNOWN_PRODUCT_NAME: &str = "Unknown";

// =============================================================================
// List Envelopes
// =============================================================================

/// Pull a list out of a body that is either a bare array or an object
/// wrapping it under one of `keys`. Anything else (including `null` or an
/// object without those keys) is an empty list.
///
/// # Errors
///
/// Returns an error if the list is found but its elements do not match `T`.
pub fn extract_list<T: DeserializeOwned>(
    value: serde_json::Value,
    keys: &[&str],
) -> Result<Vec<T>, serde_json::Error> {
    match value {
        serde_json::Value::Array(_) => serde_json::from_value(value),
        serde_json::Value::Object(mut map) => {
            for key in keys {
                if let Some(inner @ serde_json::Value::Array(_)) = map.remove(*key) {
                    return serde_json::from_value(inner);
                }
            }
            Ok(Vec::new())
        }
        _ => Ok(Vec::new()),
    }
}

// =============================================================================
// Cart Lines
// =============================================================================

/// Cart line exactly as `GET /cart` returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCartLine {
    pub id: CartItemId,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub product: Option<RawCartProduct>,
    #[serde(default)]
    pub variant: Option<RawCartVariant>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCartProduct {
    #[serde(default)]
    pub id: Option<ProductId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCartVariant {
    #[serde(default)]
    pub id: Option<VariantId>,
    #[serde(default, deserialize_with = "decimal_or_zero")]
    pub price: Decimal,
    #[serde(default, rename = "image", deserialize_with = "image_list")]
    pub images: Vec<String>,
}

/// Normalize one raw line.
///
/// Display price comes from the variant (zero without one), images from the
/// variant image, the name falls back to [`UNKNOWN_PRODUCT_NAME`] and the
/// slug to empty. Lines without a product id cannot be matched against the
/// catalog and are dropped.
#[must_use]
pub fn convert_cart_line(raw: RawCartLine) -> Option<CartItem> {
    let product = raw.product.unwrap_or(RawCartProduct {
        id: None,
        name: None,
        slug: None,
    });

    let Some(product_id) = product.id else {
        warn!(cart_item_id = %raw.id, "Dropping cart line without product id");
        return None;
    };

    let quantity = u32::try_from(raw.quantity.max(0)).unwrap_or(u32::MAX);
    let (variant_id, price, images) = match raw.variant {
        Some(v) => (v.id, v.price, v.images),
        None => {
            warn!(cart_item_id = %raw.id, "Cart line has no variant, price defaults to 0");
            (None, Decimal::ZERO, Vec::new())
        }
    };

    Some(CartItem {
        id: raw.id,
        product_id,
        variant_id,
        quantity,
        product: ProductInfo {
            name: product
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_PRODUCT_NAME.to_string()),
            price,
            images,
            slug: product.slug.unwrap_or_default(),
        },
        provisional: false,
    })
}

/// Normalize a `GET /cart` body (array or `{ data: [...] }`).
///
/// # Errors
///
/// Returns an error if a line is not shaped like a cart line at all.
pub fn convert_cart(value: serde_json::Value) -> Result<Vec<CartItem>, serde_json::Error> {
    let raw: Vec<RawCartLine> = extract_list(value, &["data", "items"])?;
    Ok(raw.into_iter().filter_map(convert_cart_line).collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_list_shapes() {
        let bare: Vec<i64> = extract_list(json!([1, 2]), &["data"]).unwrap();
        assert_eq!(bare, vec![1, 2]);

        let wrapped: Vec<i64> = extract_list(json!({ "orders": [3] }), &["data", "orders"]).unwrap();
        assert_eq!(wrapped, vec![3]);

        let empty: Vec<i64> = extract_list(json!({ "message": "ok" }), &["data"]).unwrap();
        assert!(empty.is_empty());

        let null: Vec<i64> = extract_list(serde_json::Value::Null, &["data"]).unwrap();
        assert!(null.is_empty());

        assert!(extract_list::<i64>(json!({ "data": ["x"] }), &["data"]).is_err());
    }

    #[test]
    fn test_convert_cart_full_line() {
        let items = convert_cart(json!({ "data": [{
            "id": 10,
            "quantity": 3,
            "product": { "id": "5", "name": "Nho mẫu đơn", "slug": "nho-mau-don" },
            "variant": { "id": 51, "price": "250000.00", "image": "nho.jpg" }
        }]}))
        .unwrap();

        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.id, CartItemId::new(10));
        assert_eq!(item.product_id, ProductId::new(5));
        assert_eq!(item.variant_id, Some(VariantId::new(51)));
        assert_eq!(item.product.price, Decimal::new(250_000, 0));
        assert_eq!(item.product.images, vec!["nho.jpg"]);
        assert_eq!(item.line_total(), Decimal::new(750_000, 0));
    }

    #[test]
    fn test_convert_cart_fallbacks() {
        let items = convert_cart(json!([{
            "id": 11,
            "quantity": 1,
            "product": { "id": 6 },
            "variant": { "id": 61, "image": ["", "a.jpg", null] }
        }]))
        .unwrap();

        let item = &items[0];
        assert_eq!(item.product.name, UNKNOWN_PRODUCT_NAME);
        assert_eq!(item.product.slug, "");
        assert_eq!(item.product.price, Decimal::ZERO);
        assert_eq!(item.product.images, vec!["a.jpg"]);
    }

    #[test]
    fn test_convert_cart_drops_orphan_lines() {
        let items = convert_cart(json!([
            { "id": 1, "quantity": 1 },
            { "id": 2, "quantity": 1, "product": { "id": 9 } }
        ]))
        .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id, ProductId::new(9));
        assert_eq!(items[0].variant_id, None);
    }
}
