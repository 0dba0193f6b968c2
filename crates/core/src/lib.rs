//! Fruity Core - Shared types library.
//!
//! This crate provides common types used across all Fruity components:
//! - `storefront` - REST client and client-side stores (cart, wishlist, orders)
//! - `cli` - Command-line front end for the storefront
//! - `integration-tests` - Mock backend and end-to-end tests
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, quantities
//!   and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
