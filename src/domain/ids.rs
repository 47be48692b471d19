//! Record identifier newtypes
//!
//! The collection database keys occurrences, collections, taxa and images by
//! integer surrogate keys. Each gets its own newtype so they cannot be mixed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw key; keys must be positive
            pub fn new(id: i64) -> Result<Self, String> {
                if id <= 0 {
                    return Err(format!("{} must be positive, got {}", $label, id));
                }
                Ok(Self(id))
            }

            /// Returns the raw key
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw: i64 = s
                    .trim()
                    .parse()
                    .map_err(|_| format!("Invalid {}: '{}'", $label, s))?;
                Self::new(raw)
            }
        }
    };
}

record_id!(
    /// Primary key of a stored occurrence record (`occid`)
    OccurrenceId,
    "occurrence id"
);

record_id!(
    /// Primary key of a registered collection (`collid`)
    CollectionId,
    "collection id"
);

record_id!(
    /// Primary key of a taxon in the authority file (`tid`)
    TaxonId,
    "taxon id"
);

record_id!(
    /// Primary key of an image record (`imgid`)
    ImageId,
    "image id"
);
