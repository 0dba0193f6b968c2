//! Terminal output.
//!
//! Everything the customer reads goes through here; logs go to stderr via
//! `tracing`.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::fmt::Display;

use rust_decimal::Decimal;

use fruity_core::format_vnd;

/// Print one line to stdout.
pub fn line(text: impl Display) {
    println!("{text}");
}

/// Print a confirmation, the terminal's equivalent of a success toast.
pub fn success(text: &str) {
    println!("✔ {text}");
}

/// Print an error message to stderr.
pub fn error(text: &str) {
    eprintln!("✘ {text}");
}

/// Print a blank line.
pub fn blank() {
    println!();
}

/// `label ......... value` row.
pub fn row(label: &str, value: impl Display) {
    println!("  {label:<20} {value}");
}

/// Money row formatted as VND.
pub fn money(label: &str, amount: Decimal) {
    row(label, format_vnd(amount));
}
