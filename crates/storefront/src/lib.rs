//! Fruity Fruit storefront client library.
//!
//! A typed async client for the shop's REST API plus the client-side stores
//! built on it: cart, wishlist, address book, checkout, orders and the order
//! status watcher. Front ends construct a [`Storefront`] and drive it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod session;
pub mod state;

pub use config::StorefrontConfig;
pub use error::{AppError, Result};
pub use state::Storefront;
