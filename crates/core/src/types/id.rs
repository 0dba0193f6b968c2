//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.
//!
//! The storefront backend is not consistent about ID encoding: the same
//! product ID arrives as `12` in cart lines and as `"12"` in product
//! listings. Numeric IDs therefore deserialize from either form and always
//! serialize back as a JSON number.

use core::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Macro to define a type-safe numeric ID wrapper.
///
/// Creates a newtype wrapper around `i64` with:
/// - `Serialize` with `#[serde(transparent)]`
/// - `Deserialize` accepting a JSON number or a numeric string
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_i64()`
/// - `From<i64>`, `Into<i64>` and `FromStr` implementations
///
/// # Example
///
/// ```rust
/// # use fruity_core::define_id;
/// define_id!(ShopId);
/// define_id!(BasketId);
///
/// let shop_id = ShopId::new(1);
/// let basket_id = BasketId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: ShopId = basket_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ::serde::Serialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new ID from an i64 value.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying i64 value.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                deserializer
                    .deserialize_any($crate::types::id::NumericIdVisitor)
                    .map(Self)
            }
        }
    };
}

// Define standard entity IDs
define_id!(UserId);
define_id!(ProductId);
define_id!(VariantId);
define_id!(CartItemId);
define_id!(AddressId);
define_id!(CategoryId);
define_id!(ReviewId);
define_id!(PostId);
define_id!(WishlistItemId);

/// Visitor accepting an integer or a numeric string.
#[doc(hidden)]
pub struct NumericIdVisitor;

impl Visitor<'_> for NumericIdVisitor {
    type Value = i64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer id or a numeric string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
        Ok(v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
        i64::try_from(v).map_err(|_| E::custom(format!("id {v} out of range")))
    }

    #[allow(clippy::cast_possible_truncation)] // checked by the fract/range test
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
        if v.fract() == 0.0 && v >= i64::MIN as f64 && v <= i64::MAX as f64 {
            Ok(v as i64)
        } else {
            Err(E::custom(format!("id {v} is not an integer")))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
        v.trim()
            .parse::<i64>()
            .map_err(|_| E::custom(format!("id {v:?} is not numeric")))
    }
}

/// Order identifier.
///
/// Orders are addressed by an opaque key that may be numeric or a string,
/// so unlike the numeric IDs this one keeps its textual form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Create an order ID from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for OrderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<i64> for OrderId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl std::str::FromStr for OrderId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().to_owned()))
    }
}

struct OrderIdVisitor;

impl Visitor<'_> for OrderIdVisitor {
    type Value = OrderId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an order id as string or integer")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<OrderId, E> {
        Ok(OrderId(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<OrderId, E> {
        Ok(OrderId(v.to_string()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<OrderId, E> {
        Ok(OrderId(v.to_owned()))
    }
}

impl<'de> Deserialize<'de> for OrderId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(OrderIdVisitor)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_id_from_number() {
        let id: ProductId = serde_json::from_str("42").unwrap();
        assert_eq!(id, ProductId::new(42));
    }

    #[test]
    fn test_numeric_id_from_string() {
        let id: ProductId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(id.as_i64(), 42);
    }

    #[test]
    fn test_numeric_id_from_integral_float() {
        let id: VariantId = serde_json::from_str("7.0").unwrap();
        assert_eq!(id.as_i64(), 7);
    }

    #[test]
    fn test_numeric_id_rejects_garbage() {
        assert!(serde_json::from_str::<ProductId>("\"abc\"").is_err());
        assert!(serde_json::from_str::<ProductId>("1.5").is_err());
        assert!(serde_json::from_str::<ProductId>("null").is_err());
    }

    #[test]
    fn test_numeric_id_serializes_as_number() {
        let json = serde_json::to_string(&CartItemId::new(9)).unwrap();
        assert_eq!(json, "9");
    }

    #[test]
    fn test_numeric_id_from_str() {
        let id: AddressId = " 15 ".parse().unwrap();
        assert_eq!(id, AddressId::new(15));
        assert!("x".parse::<AddressId>().is_err());
    }

    #[test]
    fn test_order_id_accepts_both_forms() {
        let a: OrderId = serde_json::from_str("101").unwrap();
        let b: OrderId = serde_json::from_str("\"101\"").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "101");
    }

    #[test]
    fn test_order_id_display() {
        let id = OrderId::new("ORD-7");
        assert_eq!(id.to_string(), "ORD-7");
    }
}
