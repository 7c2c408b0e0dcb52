//! Newtype IDs for type-safe entity references.
//!
//! The commerce backend identifies everything with opaque GraphQL global IDs
//! (base64 strings such as `UHJvZHVjdFZhcmlhbnQ6MTI=`). Use the `define_id!`
//! macro to create wrappers that prevent accidentally mixing IDs from
//! different entity types.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Into<String>` implementations
///
/// # Example
///
/// ```rust
/// # use cartsync_core::define_id;
/// define_id!(LineId);
/// define_id!(OrderId);
///
/// let line_id = LineId::new("Q2hlY2tvdXRMaW5lOjE=");
/// let order_id = OrderId::new("T3JkZXI6MQ==");
///
/// // These are different types, so this won't compile:
/// // let _: LineId = order_id;
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
            /// Create a new ID from a GraphQL global ID.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying ID string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the ID string.
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

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(VariantId);
define_id!(ProductId);
define_id!(CheckoutId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_serializes_transparently() {
        let id = VariantId::new("UHJvZHVjdFZhcmlhbnQ6MTI=");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"UHJvZHVjdFZhcmlhbnQ6MTI=\"");
    }

    #[test]
    fn test_id_display_and_conversions() {
        let id = CheckoutId::from("abc");
        assert_eq!(id.to_string(), "abc");
        assert_eq!(id.as_str(), "abc");
        assert_eq!(String::from(id), "abc");
    }
}
