//! Identifiers
//!
//! Typed wrappers around the string identifiers issued by the external store. One opaque
//! type per entity keeps product, category, collection, segment, customer and promotion
//! ids from being interchanged.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create an identifier from anything string-like.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// The identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

id_type! {
    /// Product identifier
    ProductId
}

id_type! {
    /// Category identifier
    CategoryId
}

id_type! {
    /// Collection identifier
    CollectionId
}

id_type! {
    /// Customer segment identifier
    SegmentId
}

id_type! {
    /// Customer identifier
    CustomerId
}

id_type! {
    /// Promotion identifier
    PromotionId
}
