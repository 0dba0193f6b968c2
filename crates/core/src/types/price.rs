//! Price formatting for Vietnamese đồng.
//!
//! The shop sells in Vietnamese đồng, which has no minor unit. Amounts are
//! kept as [`Decimal`] so that string prices from the backend (`"85000.00"`)
//! and numeric ones (`85000`) compare and sum exactly.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Format an amount the way the shop prints prices: rounded to whole đồng,
/// `.` as thousands separator, ` đ` suffix.
///
/// ```
/// use fruity_core::format_vnd;
/// use rust_decimal::Decimal;
///
/// assert_eq!(format_vnd(Decimal::new(85_000, 0)), "85.000 đ");
/// assert_eq!(format_vnd(Decimal::ZERO), "0 đ");
/// ```
#[must_use]
pub fn format_vnd(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let whole = rounded.abs().to_u128().unwrap_or(0);
    if whole == 0 {
        return "0 đ".to_string();
    }

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if rounded.is_sign_negative() {
        format!("-{grouped} đ")
    } else {
        format!("{grouped} đ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_vnd_thousands() {
        assert_eq!(format_vnd(Decimal::new(85_000, 0)), "85.000 đ");
        assert_eq!(format_vnd(Decimal::new(1_250_000, 0)), "1.250.000 đ");
        assert_eq!(format_vnd(Decimal::new(999, 0)), "999 đ");
    }

    #[test]
    fn test_format_vnd_rounds_fraction() {
        assert_eq!(format_vnd(Decimal::new(8_500_050, 2)), "85.001 đ");
        assert_eq!(format_vnd(Decimal::new(8_500_049, 2)), "85.000 đ");
    }

    #[test]
    fn test_format_vnd_zero_and_negative() {
        assert_eq!(format_vnd(Decimal::ZERO), "0 đ");
        assert_eq!(format_vnd(Decimal::new(-15_000, 0)), "-15.000 đ");
    }
}
