//! Type-safe identifiers for stops, trips and routes.
//!
//! All identifiers use Arc<str> so a stop id can be shared between the
//! schedule, the render states and the directory without reallocating.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

macro_rules! impl_identifier {
    ($name:ident) => {
        #[derive(Clone, Debug)]
        pub struct $name(Arc<str>);

        impl $name {
            pub fn new(s: impl AsRef<str>) -> Self {
                Self(s.as_ref().into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
            }
        }

        impl Eq for $name {}

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.0.hash(state);
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        #[cfg(feature = "serde")]
        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.0)
            }
        }
    };
}

impl_identifier!(StopIdentifier);
impl_identifier!(TripIdentifier);
impl_identifier!(RouteIdentifier);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_equality() {
        let id1 = StopIdentifier::new("STOP_12");
        let id2 = StopIdentifier::new("STOP_12");
        let id3 = id1.clone();

        assert_eq!(id1, id2);
        assert_eq!(id1, id3);
        assert!(Arc::ptr_eq(&id1.0, &id3.0));
    }

    #[test]
    fn test_identifier_is_case_sensitive() {
        assert_ne!(StopIdentifier::new("s1"), StopIdentifier::new("S1"));
    }

    #[test]
    fn test_identifier_hash() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(TripIdentifier::new("T100"), 42);

        assert_eq!(map.get(&TripIdentifier::new("T100")), Some(&42));
    }

    #[test]
    fn test_identifier_display() {
        let id = RouteIdentifier::new("R02");
        assert_eq!(format!("{}", id), "R02");
        assert_eq!(format!("[{:<5}]", id), "[R02  ]");
    }
}
