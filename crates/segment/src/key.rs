//! Key codec for the on-disk line format.
//!
//! Segment lookups compare keys decoded from disk against the query key, so
//! every key type needs a canonical text round-trip in addition to a total
//! order.

use crate::{Error, Result};

/// A key that can be stored in a segment.
///
/// Requirements: total order (for sorted segments and merge), cloning (keys
/// are sampled into sparse indexes), and a canonical text round-trip.
///
/// `decode` is the boundary where mixed key types are caught: a segment line
/// whose key text does not decode as `Self` surfaces
/// [`Error::KeyMismatch`] instead of comparing unlike types.
pub trait StoreKey: Ord + Clone {
    /// Canonical text form written to the segment file.
    fn encode(&self) -> String;

    /// Parses the canonical text form back into a key.
    fn decode(text: &str) -> Result<Self>;
}

impl StoreKey for String {
    fn encode(&self) -> String {
        self.clone()
    }

    fn decode(text: &str) -> Result<Self> {
        Ok(text.to_string())
    }
}

macro_rules! impl_store_key_for_int {
    ($($ty:ty),*) => {
        $(
            impl StoreKey for $ty {
                fn encode(&self) -> String {
                    self.to_string()
                }

                fn decode(text: &str) -> Result<Self> {
                    text.parse().map_err(|_| {
                        Error::KeyMismatch(format!(
                            "expected {} key, found {:?}",
                            stringify!($ty),
                            text
                        ))
                    })
                }
            }
        )*
    };
}

impl_store_key_for_int!(i32, i64, u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_round_trip() {
        let key = 97i64;
        assert_eq!(key.encode(), "97");
        assert_eq!(i64::decode("97").unwrap(), 97);
    }

    #[test]
    fn negative_integer_round_trip() {
        assert_eq!((-41i32).encode(), "-41");
        assert_eq!(i32::decode("-41").unwrap(), -41);
    }

    #[test]
    fn string_round_trip() {
        let key = "Bulgaria".to_string();
        assert_eq!(key.encode(), "Bulgaria");
        assert_eq!(String::decode("Bulgaria").unwrap(), "Bulgaria");
    }

    #[test]
    fn decoding_text_as_integer_is_a_type_mismatch() {
        let err = i64::decode("Bulgaria").unwrap_err();
        assert!(matches!(err, Error::KeyMismatch(_)));
    }

    #[test]
    fn unsigned_rejects_negative() {
        assert!(u64::decode("-1").is_err());
    }
}
