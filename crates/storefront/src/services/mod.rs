//! Client-side stores and flows over the API client.
//!
//! # Services
//!
//! - `auth` - Login, registration, password reset, logout
//! - `cart` - Cart state mirrored from the server cart
//! - `wishlist` - Wishlist state with add/remove toggling
//! - `addresses` - Address book and location lookups
//! - `checkout` - Shipping quote, order summary, order submission
//! - `orders` - Order history and detail
//! - `order_watcher` - Background polling for order status changes
//! - `notifications` - Notification center fed by the watcher
//! - `catalog` - Product listings, categories, variants, reviews
//! - `profile` - Customer profile and password change
//! - `content` - Blog posts and the contact form

pub mod addresses;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod content;
pub mod notifications;
pub mod order_watcher;
pub mod orders;
pub mod profile;
pub mod wishlist;
