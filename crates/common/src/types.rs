//! Validated string identifiers shared across bounded contexts.

use thiserror::Error;

/// Errors raised when constructing or converting an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// The identifier was empty or contained only whitespace.
    #[error("{kind} cannot be blank")]
    Blank { kind: &'static str },

    /// The identifier is not UUID-shaped, so it cannot be converted to one.
    #[error("{kind} '{value}' is not a valid UUID")]
    NotUuid { kind: &'static str, value: String },
}

/// Defines a validated newtype identifier over `String`.
///
/// The generated type can only be built through `of` (which rejects blank input),
/// `generate` (random v4 UUID) or `from_uuid`. Equality, ordering and hashing derive
/// from the wrapped value. The caller crate must depend on `serde` and `uuid`.
#[macro_export]
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize,
        )]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Wraps a value, rejecting empty or whitespace-only input.
            pub fn of(value: impl Into<String>) -> Result<Self, $crate::IdError> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err($crate::IdError::Blank { kind: $kind });
                }
                Ok(Self(value))
            }

            /// Generates a new random identifier.
            pub fn generate() -> Self {
                Self(::uuid::Uuid::new_v4().to_string())
            }

            /// Creates an identifier from an existing UUID.
            pub fn from_uuid(uuid: ::uuid::Uuid) -> Self {
                Self(uuid.to_string())
            }

            /// Returns the wrapped value.
            pub fn value(&self) -> &str {
                &self.0
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns true if the value parses as a UUID.
            pub fn is_uuid_format(&self) -> bool {
                ::uuid::Uuid::parse_str(&self.0).is_ok()
            }

            /// Converts the identifier to a UUID.
            pub fn to_uuid(&self) -> Result<::uuid::Uuid, $crate::IdError> {
                ::uuid::Uuid::parse_str(&self.0).map_err(|_| $crate::IdError::NotUuid {
                    kind: $kind,
                    value: self.0.clone(),
                })
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::of(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::of(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = $crate::IdError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::of(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Unique identifier for a product in the catalogue.
    ProductId,
    "Product ID"
);

string_id!(
    /// Unique identifier for a customer.
    CustomerId,
    "Customer ID"
);

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use uuid::Uuid;

    #[test]
    fn product_id_of_preserves_value() {
        let id = ProductId::of("product-123").unwrap();
        assert_eq!(id.value(), "product-123");
        assert_eq!(id.to_string(), "product-123");
    }

    #[test]
    fn product_id_rejects_blank_values() {
        assert_eq!(
            ProductId::of(""),
            Err(IdError::Blank {
                kind: "Product ID"
            })
        );
        assert!(ProductId::of("   ").is_err());
        assert!(ProductId::of("\t\n").is_err());
    }

    #[test]
    fn generated_ids_are_uuid_shaped_and_unique() {
        let ids: std::collections::HashSet<_> = (0..1000).map(|_| ProductId::generate()).collect();
        assert_eq!(ids.len(), 1000);
        assert!(ids.iter().all(ProductId::is_uuid_format));
    }

    #[test]
    fn uuid_conversion() {
        let uuid = Uuid::new_v4();
        let id = CustomerId::from_uuid(uuid);
        assert!(id.is_uuid_format());
        assert_eq!(id.to_uuid().unwrap(), uuid);

        let id = CustomerId::of("not-a-uuid").unwrap();
        assert!(!id.is_uuid_format());
        assert!(matches!(id.to_uuid(), Err(IdError::NotUuid { .. })));
    }

    #[test]
    fn equality_is_by_value() {
        let a = ProductId::of("product-123").unwrap();
        let b: ProductId = "product-123".parse().unwrap();
        let c = ProductId::of("product-456").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = ProductId::of("SKU-001").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"SKU-001\"");

        let back: ProductId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn deserialization_validates() {
        let result: Result<ProductId, _> = serde_json::from_str("\"  \"");
        assert!(result.is_err());
    }

    proptest! {
        #[test]
        fn any_non_blank_string_round_trips(value in "\\PC{1,40}") {
            prop_assume!(!value.trim().is_empty());
            let id = ProductId::of(value.clone()).unwrap();
            prop_assert_eq!(id.value(), value.as_str());
            prop_assert_eq!(id.to_string(), value);
        }
    }
}
