//! Subcommand implementations.

pub mod account;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod content;
pub mod orders;
