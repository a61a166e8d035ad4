//! Newtype IDs for type-safe entity references.
//!
//! The backend issues opaque string identifiers (UUIDs) for every entity.
//! Use the `define_id!` macro to create wrappers that prevent accidentally
//! passing a cart item ID where an order ID is expected.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use nongsan_core::define_id;
/// define_id!(FarmId);
/// define_id!(BasketId);
///
/// let farm = FarmId::new("f-1");
/// let basket = BasketId::new("b-1");
///
/// // These are different types, so this won't compile:
/// // let _: FarmId = basket;
/// assert_eq!(farm.as_str(), "f-1");
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(AccountId);
define_id!(FarmerId);
define_id!(ProductId);
define_id!(OrderId);
define_id!(CartItemId);
define_id!(AddressId);
define_id!(CategoryId);
define_id!(MarketPriceId);
define_id!(OcopId);
define_id!(ImageId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = OrderId::new("7f0c");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"7f0c\"");

        let parsed: OrderId = serde_json::from_str("\"7f0c\"").unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_id_display_and_conversions() {
        let id = CartItemId::from("ci-1");
        assert_eq!(id.to_string(), "ci-1");
        assert_eq!(id.as_str(), "ci-1");
        assert_eq!(id.into_inner(), "ci-1".to_string());
    }
}
