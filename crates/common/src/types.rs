use serde::{Deserialize, Serialize};

/// Declares an integer identifier newtype.
///
/// Every row in the backend is keyed by a store-assigned `i64`. Wrapping each
/// key in its own type keeps a product id from being passed where a
/// transaction id is expected.
macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates an identifier from a raw store key.
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the raw store key.
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
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
    };
}

id_type!(
    /// Identifier of a product category.
    CategoryId
);

id_type!(
    /// Identifier of a product.
    ProductId
);

id_type!(
    /// Identifier of a committed sale.
    TransactionId
);

id_type!(
    /// Identifier of a single line of a committed sale.
    DetailId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_id_preserves_value() {
        let id = ProductId::new(42);
        assert_eq!(id.as_i64(), 42);
        assert_eq!(i64::from(id), 42);
    }

    #[test]
    fn ids_order_by_raw_value() {
        let mut ids = vec![ProductId::new(3), ProductId::new(1), ProductId::new(2)];
        ids.sort();
        assert_eq!(ids, vec![ProductId::new(1), ProductId::new(2), ProductId::new(3)]);
    }

    #[test]
    fn ids_serialize_as_plain_integers() {
        let json = serde_json::to_string(&TransactionId::new(7)).unwrap();
        assert_eq!(json, "7");

        let id: CategoryId = serde_json::from_str("12").unwrap();
        assert_eq!(id, CategoryId::new(12));
    }

    #[test]
    fn display_prints_raw_value() {
        assert_eq!(DetailId::new(99).to_string(), "99");
    }
}
