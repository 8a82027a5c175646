use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Namespace for identifiers derived from natural keys (customer carts, daily
/// order-number sequences).
const DERIVED_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2b4e_8d3a_4c55_9e07_5a1b_c0de_f00d);

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

uuid_identifier!(
    /// Identifier of an event stream (cart, order, product, sequence).
    AggregateId
);

uuid_identifier!(
    /// Identifier of an authenticated customer.
    CustomerId
);

uuid_identifier!(
    /// Identifier of a catalog product.
    ProductId
);

impl AggregateId {
    /// Derives a stable stream id from a natural key.
    ///
    /// The same `(kind, key)` pair always yields the same id, which lets a
    /// stream be addressed without a lookup table: one cart per customer, one
    /// order-number sequence per calendar day.
    pub fn derived(kind: &str, key: &str) -> Self {
        let name = format!("{kind}:{key}");
        Self(Uuid::new_v5(&DERIVED_ID_NAMESPACE, name.as_bytes()))
    }
}

impl From<ProductId> for AggregateId {
    fn from(id: ProductId) -> Self {
        Self(id.as_uuid())
    }
}
