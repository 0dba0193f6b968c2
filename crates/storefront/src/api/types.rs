//! Domain types for the storefront REST API.
//!
//! The backend mixes naming conventions (`order_status` next to
//! `paymentUrl`) and sends ids and prices either as numbers or as strings.
//! These types absorb that at the edge so the rest of the crate works with
//! typed ids and [`Decimal`] amounts.

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use fruity_core::{
    AddressId, CategoryId, OrderId, OrderStatus, PaymentMethod, PaymentStatus, PostId, ProductId,
    ReviewId, UserId, VariantId, format_vnd,
};

// =============================================================================
// Lenient Field Helpers
// =============================================================================

/// Decimal that may be absent or `null`; both read as zero.
pub(crate) fn decimal_or_zero<'de, D: Deserializer<'de>>(d: D) -> Result<Decimal, D::Error> {
    Ok(Option::<Decimal>::deserialize(d)?.unwrap_or_default())
}

/// String that may arrive as a number (location codes, customer ids).
pub(crate) fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(d)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Value that is dropped instead of failing when it has an unexpected shape.
pub(crate) fn lenient<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(d)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Order status that is missing, `null` or unrecognised reads as pending.
pub(crate) fn status_or_pending<'de, D: Deserializer<'de>>(d: D) -> Result<OrderStatus, D::Error> {
    Ok(lenient(d)?.unwrap_or_default())
}

/// Image field that may be a single URL or a list; blank entries are dropped.
pub(crate) fn image_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(d)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => vec![s],
        Some(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

// =============================================================================
// Auth Types
// =============================================================================

/// Logged-in customer as returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// Fields this client does not model, kept so the persisted session
    /// round-trips what the backend sent.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Body returned by every `/auth/*` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Generic acknowledgement body (`{ success?, message? }`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// Catalog Types
// =============================================================================

/// Product images.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImages {
    #[serde(default)]
    pub gallery: Vec<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl ProductImages {
    /// Thumbnail, or the first gallery image.
    #[must_use]
    pub fn primary(&self) -> Option<&str> {
        self.thumbnail
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.gallery.first().map(String::as_str))
    }

    /// Every image URL, thumbnail first, without duplicates.
    #[must_use]
    pub fn all(&self) -> Vec<String> {
        let mut urls: Vec<String> = Vec::with_capacity(self.gallery.len() + 1);
        for url in self.thumbnail.iter().chain(self.gallery.iter()) {
            if !url.trim().is_empty() && !urls.contains(url) {
                urls.push(url.clone());
            }
        }
        urls
    }
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default, deserialize_with = "decimal_or_zero")]
    pub price: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub images: Option<ProductImages>,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Product {
    /// Display price, e.g. `85.000 đ`.
    #[must_use]
    pub fn display_price(&self) -> String {
        format_vnd(self.price)
    }

    /// First variant, the one added to the cart when none is chosen.
    #[must_use]
    pub fn default_variant(&self) -> Option<&Variant> {
        self.variants.first()
    }

    /// Snapshot used for optimistic cart updates.
    #[must_use]
    pub fn cart_info(&self, variant: Option<&Variant>) -> ProductInfo {
        let mut images = variant.map(|v| v.images.clone()).unwrap_or_default();
        if images.is_empty() {
            images = self.images.as_ref().map(ProductImages::all).unwrap_or_default();
        }
        ProductInfo {
            name: self.name.clone(),
            price: variant.map_or(self.price, |v| v.price),
            images,
            slug: self.slug.clone(),
        }
    }
}

/// A purchasable configuration of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "decimal_or_zero")]
    pub price: Decimal,
    #[serde(default, rename = "image", deserialize_with = "image_list")]
    pub images: Vec<String>,
}

/// A product review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub rating: u8,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Pagination block of a product page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub total_items: u64,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub current_page: u32,
}

impl Pagination {
    /// Whether a page follows the current one.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// One page of the product listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
    #[serde(default)]
    pub data: Vec<Product>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// A node in the category tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    #[serde(default)]
    pub children: Vec<Category>,
}

impl Category {
    /// Depth-first search of this subtree for `slug`.
    #[must_use]
    pub fn find_by_slug(&self, slug: &str) -> Option<&Self> {
        if self.slug == slug {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_by_slug(slug))
    }
}

/// Find a category anywhere in a forest.
#[must_use]
pub fn find_category<'a>(tree: &'a [Category], slug: &str) -> Option<&'a Category> {
    tree.iter().find_map(|c| c.find_by_slug(slug))
}

/// Sort orders supported by the product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProductSort {
    #[default]
    Latest,
    PriceLowHigh,
    PriceHighLow,
}

impl ProductSort {
    /// `sortBy` / `sortOrder` query values.
    #[must_use]
    pub const fn query_values(&self) -> (&'static str, &'static str) {
        match self {
            Self::Latest => ("created_at", "desc"),
            Self::PriceLowHigh => ("price", "asc"),
            Self::PriceHighLow => ("price", "desc"),
        }
    }
}

impl std::str::FromStr for ProductSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "latest" => Ok(Self::Latest),
            "priceLowHigh" | "price-asc" => Ok(Self::PriceLowHigh),
            "priceHighLow" | "price-desc" => Ok(Self::PriceHighLow),
            other => Err(format!("invalid sort: {other}")),
        }
    }
}

/// Product listing filters.
///
/// Unset or empty values are left out of the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilters {
    pub search: Option<String>,
    pub category_id: Option<CategoryId>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<ProductSort>,
    pub featured: bool,
}

impl ProductFilters {
    /// Query pairs for `GET /products`.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        if let Some(id) = self.category_id {
            pairs.push(("categoryId", id.to_string()));
        }
        if let Some(min) = self.min_price {
            pairs.push(("minPrice", min.normalize().to_string()));
        }
        if let Some(max) = self.max_price {
            pairs.push(("maxPrice", max.normalize().to_string()));
        }
        if let Some(page) = self.page.filter(|p| *p > 0) {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit.filter(|l| *l > 0) {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(sort) = self.sort {
            let (by, order) = sort.query_values();
            pairs.push(("sortBy", by.to_string()));
            pairs.push(("sortOrder", order.to_string()));
        }
        if self.featured {
            pairs.push(("isFeatured", "true".to_string()));
        }
        pairs
    }

    /// Whether the result depends on free-text search (not cached).
    #[must_use]
    pub fn is_search(&self) -> bool {
        self.search.as_deref().is_some_and(|s| !s.trim().is_empty())
    }
}

// =============================================================================
// Cart Types
// =============================================================================

/// Display fields denormalized onto a cart line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub slug: String,
}

/// A cart line after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: fruity_core::CartItemId,
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
    pub quantity: u32,
    pub product: ProductInfo,
    /// Line added locally and not yet confirmed by a refetch.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub provisional: bool,
}

impl CartItem {
    /// `price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

// =============================================================================
// Wishlist Types
// =============================================================================

/// Product snapshot held on a wishlist line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistProduct {
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default, deserialize_with = "decimal_or_zero")]
    pub price: Decimal,
    #[serde(default, deserialize_with = "lenient")]
    pub images: Option<ProductImages>,
}

/// A wishlist line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistItem {
    pub product: WishlistProduct,
}

impl WishlistItem {
    /// Product this line refers to.
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        self.product.id
    }
}

// =============================================================================
// Address & Location Types
// =============================================================================

/// A saved delivery address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub province_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub district_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ward_code: Option<String>,
    #[serde(default)]
    pub province_name: Option<String>,
    #[serde(default)]
    pub district_name: Option<String>,
    #[serde(default)]
    pub ward_name: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

impl Address {
    /// One-line rendering: street, ward, district, province.
    #[must_use]
    pub fn full_address(&self) -> String {
        std::iter::once(self.address.as_str())
            .chain(self.ward_name.as_deref())
            .chain(self.district_name.as_deref())
            .chain(self.province_name.as_deref())
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// District and ward codes, when both are present and usable for a
    /// shipping quote.
    #[must_use]
    pub fn shipping_destination(&self) -> Option<(i64, &str)> {
        let district = self.district_code.as_deref()?.trim().parse::<i64>().ok()?;
        let ward = self.ward_code.as_deref().map(str::trim).filter(|w| !w.is_empty())?;
        Some((district, ward))
    }
}

/// Payload for creating or fully updating an address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AddressInput {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub province_code: String,
    pub district_code: String,
    pub ward_code: String,
    pub is_default: bool,
}

impl AddressInput {
    /// Names of required fields that are blank.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("phone", &self.phone),
            ("address", &self.address),
            ("province_code", &self.province_code),
            ("district_code", &self.district_code),
            ("ward_code", &self.ward_code),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(k, _)| k)
        .collect()
    }
}

/// Province, district or ward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    #[serde(deserialize_with = "required_code")]
    pub code: String,
    pub name: String,
}

fn required_code<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    lenient_string(d)?.ok_or_else(|| serde::de::Error::custom("location code must be a string or number"))
}

// =============================================================================
// Shipping Types
// =============================================================================

/// Body of `POST /shipping/options`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippingQuoteRequest {
    #[serde(rename = "carrierCode")]
    pub carrier_code: String,
    pub to_district_id: i64,
    pub to_ward_code: String,
    pub items: Vec<ShippingItem>,
}

/// One cart line as seen by the carrier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippingItem {
    pub quantity: u32,
    /// Grams.
    pub weight: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// A carrier service offered for a destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingOption {
    #[serde(default, deserialize_with = "decimal_or_zero")]
    pub fee: Decimal,
    #[serde(default, deserialize_with = "decimal_or_zero")]
    pub cod_fee: Decimal,
    #[serde(default)]
    pub service_id: Option<i64>,
    #[serde(default)]
    pub service_type_id: Option<i64>,
    #[serde(default, alias = "short_name", alias = "service_name")]
    pub name: Option<String>,
}

/// Pick the option with the lowest fee; ties keep the earliest.
#[must_use]
pub fn cheapest_option(options: &[ShippingOption]) -> Option<&ShippingOption> {
    options.iter().reduce(|min, o| if o.fee < min.fee { o } else { min })
}

// =============================================================================
// Order Types
// =============================================================================

/// Row of `GET /orders/my-orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: OrderId,
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(rename = "order_status", default, deserialize_with = "status_or_pending")]
    pub status: OrderStatus,
    #[serde(default, deserialize_with = "lenient")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default, deserialize_with = "decimal_or_zero")]
    pub total_amount: Decimal,
    #[serde(default, alias = "created_at")]
    pub order_date: Option<String>,
}

/// Full order from `GET /orders/my-orders/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(rename = "order_status", default, deserialize_with = "status_or_pending")]
    pub status: OrderStatus,
    #[serde(default, deserialize_with = "lenient")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub shipping_address: Option<String>,
    #[serde(default, deserialize_with = "decimal_or_zero")]
    pub shipping_fee: Decimal,
    #[serde(default, deserialize_with = "decimal_or_zero")]
    pub total_amount: Decimal,
    #[serde(default, alias = "order_date")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub history: Vec<OrderHistoryEntry>,
    #[serde(default)]
    pub shipment: Option<Shipment>,
}

impl Order {
    /// Sum of line totals, excluding shipping.
    #[must_use]
    pub fn items_total(&self) -> Decimal {
        self.items.iter().map(OrderItem::line_total).sum()
    }
}

/// Line item of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default, deserialize_with = "decimal_or_zero")]
    pub unit_price: Decimal,
    #[serde(default)]
    pub image: Option<String>,
}

impl OrderItem {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Entry of an order's status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderHistoryEntry {
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Carrier shipment attached to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipment {
    #[serde(default)]
    pub carrier_code: Option<String>,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "decimal_or_zero")]
    pub shipping_cost: Decimal,
    #[serde(default)]
    pub estimated_delivery_date: Option<String>,
}

/// Shipping service chosen for a new order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingSelection {
    #[serde(with = "rust_decimal::serde::float")]
    pub fee: Decimal,
    pub service_id: Option<i64>,
    pub service_type_id: i64,
}

impl ShippingSelection {
    /// Service type used when the carrier does not name one.
    pub const DEFAULT_SERVICE_TYPE_ID: i64 = 2;
}

impl From<&ShippingOption> for ShippingSelection {
    fn from(option: &ShippingOption) -> Self {
        Self {
            fee: option.fee,
            service_id: option.service_id,
            service_type_id: option
                .service_type_id
                .unwrap_or(Self::DEFAULT_SERVICE_TYPE_ID),
        }
    }
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub address_id: AddressId,
    pub shipping_option: ShippingSelection,
    pub payment_method: PaymentMethod,
    pub notes: String,
}

/// Order reference inside a create-order response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedOrder {
    pub id: OrderId,
    #[serde(default)]
    pub order_number: Option<String>,
}

/// Gateway block of a create-order response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PaymentInfo {
    #[serde(default, rename = "payUrl")]
    pub pay_url: Option<String>,
}

/// Body returned by `POST /orders`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreateOrderResponse {
    #[serde(default)]
    pub order: Option<CreatedOrder>,
    #[serde(default, rename = "paymentUrl")]
    pub payment_url: Option<String>,
    #[serde(default)]
    pub payment: Option<PaymentInfo>,
    #[serde(default)]
    pub message: Option<String>,
}

impl CreateOrderResponse {
    /// Id of the created order.
    #[must_use]
    pub fn order_id(&self) -> Option<&OrderId> {
        self.order.as_ref().map(|o| &o.id)
    }

    /// Gateway URL, from `paymentUrl` or `payment.payUrl`.
    #[must_use]
    pub fn pay_url(&self) -> Option<&str> {
        self.payment_url
            .as_deref()
            .or_else(|| self.payment.as_ref().and_then(|p| p.pay_url.as_deref()))
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }
}

// =============================================================================
// Profile, Blog & Contact Types
// =============================================================================

/// Customer profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub customer_id: Option<String>,
    #[serde(default, deserialize_with = "decimal_or_zero")]
    pub total_spent: Decimal,
    #[serde(default)]
    pub order_count: u32,
    #[serde(default)]
    pub last_order_date: Option<String>,
}

/// Fields accepted by `PUT /profile/me`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ProfileUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.avatar.is_none() && self.phone.is_none()
    }
}

/// Blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub views: Option<u64>,
    #[serde(default)]
    pub seo_title: Option<String>,
    #[serde(default)]
    pub seo_description: Option<String>,
}

impl Post {
    /// SEO title, falling back to the post title.
    #[must_use]
    pub fn meta_title(&self) -> &str {
        self.seo_title.as_deref().unwrap_or(&self.title)
    }

    /// SEO description, falling back to the excerpt.
    #[must_use]
    pub fn meta_description(&self) -> Option<&str> {
        self.seo_description.as_deref().or(self.excerpt.as_deref())
    }
}

/// Contact form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_accepts_string_price_and_id() {
        let product: Product = serde_json::from_value(json!({
            "id": "12",
            "name": "Xoài cát Hòa Lộc",
            "slug": "xoai-cat-hoa-loc",
            "price": "85000.00",
            "images": { "gallery": ["a.jpg", "b.jpg"], "thumbnail": "t.jpg" },
            "variants": [{ "id": 31, "name": "1kg", "price": 85000, "image": "v.jpg" }]
        }))
        .unwrap();

        assert_eq!(product.id, ProductId::new(12));
        assert_eq!(product.price, Decimal::new(85_000, 0));
        assert_eq!(product.display_price(), "85.000 đ");
        assert_eq!(product.default_variant().unwrap().images, vec!["v.jpg"]);
    }

    #[test]
    fn test_product_tolerates_bad_images() {
        let product: Product = serde_json::from_value(json!({
            "id": 1, "name": "Cam", "price": null, "images": "nope"
        }))
        .unwrap();
        assert_eq!(product.price, Decimal::ZERO);
        assert!(product.images.is_none());
    }

    #[test]
    fn test_cart_info_prefers_variant() {
        let product: Product = serde_json::from_value(json!({
            "id": 1, "name": "Cam", "slug": "cam", "price": 30000,
            "images": { "gallery": ["g.jpg"], "thumbnail": "t.jpg" },
            "variants": [{ "id": 2, "price": "35000" }]
        }))
        .unwrap();

        let info = product.cart_info(product.default_variant());
        assert_eq!(info.price, Decimal::new(35_000, 0));
        assert_eq!(info.images, vec!["t.jpg", "g.jpg"]);

        let info = product.cart_info(None);
        assert_eq!(info.price, Decimal::new(30_000, 0));
    }

    #[test]
    fn test_variant_image_list_drops_blanks() {
        let variant: Variant = serde_json::from_value(json!({
            "id": 5, "price": 1, "image": ["a.jpg", " ", 7, "b.jpg"]
        }))
        .unwrap();
        assert_eq!(variant.images, vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn test_filters_drop_empty_values() {
        let filters = ProductFilters {
            search: Some("  ".to_string()),
            page: Some(0),
            limit: Some(12),
            ..ProductFilters::default()
        };
        assert_eq!(filters.query_pairs(), vec![("limit", "12".to_string())]);
        assert!(!filters.is_search());
    }

    #[test]
    fn test_filters_full_query() {
        let filters = ProductFilters {
            search: Some("xoài".to_string()),
            category_id: Some(CategoryId::new(3)),
            min_price: Some(Decimal::new(10_000, 0)),
            max_price: Some(Decimal::new(5_000_000, 2)),
            page: Some(2),
            limit: None,
            sort: Some(ProductSort::PriceHighLow),
            featured: true,
        };
        assert_eq!(
            filters.query_pairs(),
            vec![
                ("search", "xoài".to_string()),
                ("categoryId", "3".to_string()),
                ("minPrice", "10000".to_string()),
                ("maxPrice", "50000".to_string()),
                ("page", "2".to_string()),
                ("sortBy", "price".to_string()),
                ("sortOrder", "desc".to_string()),
                ("isFeatured", "true".to_string()),
            ]
        );
    }

    #[test]
    fn test_sort_parse() {
        assert_eq!("priceLowHigh".parse::<ProductSort>().unwrap(), ProductSort::PriceLowHigh);
        assert!("random".parse::<ProductSort>().is_err());
    }

    #[test]
    fn test_category_tree_lookup() {
        let tree: Vec<Category> = serde_json::from_value(json!([
            { "id": 1, "name": "Trái cây", "slug": "trai-cay", "children": [
                { "id": 2, "name": "Nhập khẩu", "slug": "nhap-khau", "parent_id": "1" }
            ]},
            { "id": 3, "name": "Quà tặng", "slug": "qua-tang" }
        ]))
        .unwrap();

        let found = find_category(&tree, "nhap-khau").unwrap();
        assert_eq!(found.id, CategoryId::new(2));
        assert_eq!(found.parent_id, Some(CategoryId::new(1)));
        assert!(find_category(&tree, "rau").is_none());
    }

    #[test]
    fn test_address_destination() {
        let address: Address = serde_json::from_value(json!({
            "id": 4, "name": "Lan", "phone": "0901", "address": "12 Lê Lợi",
            "district_code": 1442, "ward_code": "20109",
            "ward_name": "Bến Nghé", "district_name": "Quận 1", "province_name": "TP.HCM",
            "is_default": true
        }))
        .unwrap();

        assert_eq!(address.shipping_destination(), Some((1442, "20109")));
        assert_eq!(address.full_address(), "12 Lê Lợi, Bến Nghé, Quận 1, TP.HCM");

        let mut missing = address;
        missing.ward_code = None;
        assert_eq!(missing.shipping_destination(), None);
    }

    #[test]
    fn test_address_input_missing_fields() {
        let input = AddressInput {
            name: "Lan".to_string(),
            phone: "0901".to_string(),
            ..AddressInput::default()
        };
        assert_eq!(
            input.missing_fields(),
            vec!["address", "province_code", "district_code", "ward_code"]
        );
    }

    #[test]
    fn test_cheapest_option() {
        let options: Vec<ShippingOption> = serde_json::from_value(json!([
            { "fee": 32000, "service_id": 1, "service_type_id": 2 },
            { "fee": "18000", "cod_fee": 5000, "service_id": 2 },
            { "fee": 18000, "service_id": 3 }
        ]))
        .unwrap();

        let cheapest = cheapest_option(&options).unwrap();
        assert_eq!(cheapest.service_id, Some(2));
        assert_eq!(cheapest.cod_fee, Decimal::new(5_000, 0));
        assert!(cheapest_option(&[]).is_none());
    }

    #[test]
    fn test_shipping_selection_defaults() {
        let option: ShippingOption = serde_json::from_value(json!({})).unwrap();
        let selection = ShippingSelection::from(&option);
        assert_eq!(selection.fee, Decimal::ZERO);
        assert_eq!(selection.service_id, None);
        assert_eq!(selection.service_type_id, 2);

        let body = serde_json::to_value(&selection).unwrap();
        assert_eq!(body, json!({ "fee": 0.0, "service_id": null, "service_type_id": 2 }));
    }

    #[test]
    fn test_create_order_request_shape() {
        let request = CreateOrderRequest {
            address_id: AddressId::new(4),
            shipping_option: ShippingSelection {
                fee: Decimal::new(18_000, 0),
                service_id: Some(53_320),
                service_type_id: 2,
            },
            payment_method: PaymentMethod::Momo,
            notes: "Vui lòng gọi trước khi giao".to_string(),
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["addressId"], json!(4));
        assert_eq!(body["paymentMethod"], json!("momo"));
        assert_eq!(body["shippingOption"]["fee"], json!(18000.0));
        assert_eq!(body["shippingOption"]["service_id"], json!(53320));
    }

    #[test]
    fn test_create_order_response_pay_url() {
        let response: CreateOrderResponse = serde_json::from_value(json!({
            "order": { "id": 77 },
            "payment": { "payUrl": "https://test-payment.momo.vn/pay/77" }
        }))
        .unwrap();
        assert_eq!(response.order_id(), Some(&OrderId::from(77)));
        assert_eq!(response.pay_url(), Some("https://test-payment.momo.vn/pay/77"));

        let response: CreateOrderResponse =
            serde_json::from_value(json!({ "order": { "id": "A1" }, "paymentUrl": "" })).unwrap();
        assert_eq!(response.pay_url(), None);
    }

    #[test]
    fn test_order_summary_parses_label_status() {
        let order: OrderSummary = serde_json::from_value(json!({
            "id": 9, "order_status": "Vận chuyển", "payment_method": "bank",
            "payment_status": "paid", "total_amount": "120000", "order_date": "2025-10-01T08:00:00Z"
        }))
        .unwrap();
        assert_eq!(order.status, OrderStatus::Shipped);
        assert_eq!(order.payment_method, None);
        assert!(order.payment_status.is_paid());
        assert_eq!(order.total_amount, Decimal::new(120_000, 0));
    }

    #[test]
    fn test_order_list_tolerates_bad_status() {
        let orders: Vec<OrderSummary> = serde_json::from_value(json!([
            { "id": 1, "order_status": "shipped" },
            { "id": 2, "order_status": null },
            { "id": 3, "order_status": "returned" },
            { "id": 4 }
        ]))
        .unwrap();

        let statuses: Vec<_> = orders.iter().map(|o| o.status).collect();
        assert_eq!(
            statuses,
            vec![
                OrderStatus::Shipped,
                OrderStatus::Pending,
                OrderStatus::Pending,
                OrderStatus::Pending
            ]
        );
    }

    #[test]
    fn test_order_detail_tolerates_bad_status() {
        let order: Order =
            serde_json::from_value(json!({ "id": 9, "order_status": 5, "items": [] })).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn test_order_detail_totals() {
        let order: Order = serde_json::from_value(json!({
            "id": "9", "order_status": "pending", "shipping_fee": "18000",
            "total_amount": 138000,
            "items": [
                { "product_name": "Cam", "quantity": 2, "unit_price": "30000" },
                { "product_name": "Táo", "quantity": 1, "unit_price": 60000 }
            ],
            "history": [{ "status": "whatever", "notes": "Tạo đơn" }],
            "shipment": { "carrier_code": "ghn", "shipping_cost": "18000" }
        }))
        .unwrap();
        assert_eq!(order.items_total(), Decimal::new(120_000, 0));
        assert_eq!(order.history[0].status, None);
        assert_eq!(order.shipment.unwrap().shipping_cost, Decimal::new(18_000, 0));
    }

    #[test]
    fn test_profile_update_skips_unset() {
        let update = ProfileUpdate {
            phone: Some("0909".to_string()),
            ..ProfileUpdate::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({ "phone": "0909" }));
        assert!(ProfileUpdate::default().is_empty());
    }

    #[test]
    fn test_post_meta_fallbacks() {
        let post: Post = serde_json::from_value(json!({
            "id": 1, "title": "Mùa vải", "slug": "mua-vai", "excerpt": "Vải thiều"
        }))
        .unwrap();
        assert_eq!(post.meta_title(), "Mùa vải");
        assert_eq!(post.meta_description(), Some("Vải thiều"));
    }

    #[test]
    fn test_user_keeps_extra_fields() {
        let user: User = serde_json::from_value(json!({
            "id": 3, "name": "Lan", "email": "lan@fruity.vn", "user_type": 2
        }))
        .unwrap();
        assert_eq!(user.extra.get("user_type"), Some(&json!(2)));
        let back = serde_json::to_value(&user).unwrap();
        assert_eq!(back["user_type"], json!(2));
    }
}
