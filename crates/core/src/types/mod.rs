//! Core types for Fruity.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod quantity;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::format_vnd;
pub use quantity::QuantityBounds;
pub use status::*;
