//! Quantity bounds for cart lines.

use serde::{Deserialize, Serialize};

/// Inclusive bounds a cart line quantity must stay within.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityBounds {
    /// Smallest allowed quantity.
    pub min: u32,
    /// Largest allowed quantity.
    pub max: u32,
}

impl Default for QuantityBounds {
    fn default() -> Self {
        Self { min: 1, max: 99 }
    }
}

impl QuantityBounds {
    /// Create bounds, swapping the ends if given in the wrong order.
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Clamp a requested quantity into the bounds.
    ///
    /// Accepts a signed value so that user input like `-3` clamps to `min`
    /// instead of failing to parse.
    #[must_use]
    pub fn clamp(&self, requested: i64) -> u32 {
        let clamped = requested.clamp(i64::from(self.min), i64::from(self.max));
        u32::try_from(clamped).unwrap_or(self.min)
    }

    /// Whether `value` can be incremented without leaving the bounds.
    #[must_use]
    pub const fn can_increase(&self, value: u32) -> bool {
        value < self.max
    }

    /// Whether `value` can be decremented without leaving the bounds.
    #[must_use]
    pub const fn can_decrease(&self, value: u32) -> bool {
        value > self.min
    }

    /// Whether `value` lies within the bounds.
    #[must_use]
    pub const fn contains(&self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bounds() {
        let bounds = QuantityBounds::default();
        assert_eq!(bounds.min, 1);
        assert_eq!(bounds.max, 99);
    }

    #[test]
    fn test_clamp() {
        let bounds = QuantityBounds::default();
        assert_eq!(bounds.clamp(0), 1);
        assert_eq!(bounds.clamp(-5), 1);
        assert_eq!(bounds.clamp(50), 50);
        assert_eq!(bounds.clamp(150), 99);
    }

    #[test]
    fn test_step_limits() {
        let bounds = QuantityBounds::new(1, 3);
        assert!(!bounds.can_decrease(1));
        assert!(bounds.can_decrease(2));
        assert!(bounds.can_increase(2));
        assert!(!bounds.can_increase(3));
    }

    #[test]
    fn test_new_swaps_inverted_bounds() {
        let bounds = QuantityBounds::new(10, 2);
        assert_eq!(bounds, QuantityBounds { min: 2, max: 10 });
        assert!(bounds.contains(5));
        assert!(!bounds.contains(11));
    }
}
