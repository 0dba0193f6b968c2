//! Cache types for catalog responses.

use super::types::{Category, Post, ProductPage, Review, Variant};

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Box<ProductPage>),
    Variants(Vec<Variant>),
    Reviews(Vec<Review>),
    Categories(Vec<Category>),
    Post(Box<Post>),
}
