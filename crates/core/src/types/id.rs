//! Newtype IDs for type-safe entity references.
//!
//! The backend is a document store, so every identifier is an opaque string
//! (usually a 24-character object id). Use the `define_id!` macro to create
//! wrappers that prevent accidentally mixing IDs from different entity types.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `AsRef<str>` implementations
///
/// # Example
///
/// ```rust
/// # use bazaar_core::define_id;
/// define_id!(SellerId);
/// define_id!(InvoiceId);
///
/// let seller = SellerId::new("64f1c0ffee");
/// let invoice = InvoiceId::new("64f1c0ffee");
///
/// // These are different types, so this won't compile:
/// // let _: SellerId = invoice;
/// assert_eq!(seller.as_str(), invoice.as_str());
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

// Define standard entity IDs
define_id!(UserId);
define_id!(ProductId);
define_id!(AddressId);
define_id!(OrderId);
define_id!(PortfolioItemId);
define_id!(DonationId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = ProductId::new("64f1a2b3c4d5e6f708091a2b");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"64f1a2b3c4d5e6f708091a2b\"");

        let parsed: ProductId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_id_display_and_conversions() {
        let id = OrderId::from("ord-1");
        assert_eq!(id.to_string(), "ord-1");
        assert_eq!(id.as_ref(), "ord-1");
        assert_eq!(id.into_inner(), "ord-1".to_owned());
    }
}
