use derive_more::{Deref, Display, FromStr};
use serde::{Deserialize, Serialize, Serializer, de::Deserializer};
use thiserror::Error as ThisError;
use ulid::Ulid as WrappedUlid;

///
/// GuidError
///

#[derive(Debug, ThisError)]
pub enum GuidError {
    #[error("invalid guid string")]
    InvalidString,
}

///
/// GuidDecodeError
///

#[derive(Debug, ThisError)]
pub enum GuidDecodeError {
    #[error("invalid guid length: {len} bytes")]
    InvalidSize { len: usize },
}

///
/// Guid
///
/// A 128-bit, lexicographically sortable identifier. A GUID names a
/// lineage (see `db::primitives::PrimitiveStore::generation_nth`), not a
/// single primitive; at most one primitive in the lineage is live at a
/// time.
///

#[derive(Clone, Copy, Debug, Deref, Display, Eq, FromStr, Hash, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct Guid(WrappedUlid);

impl Guid {
    pub const STORED_SIZE: usize = 16;

    #[must_use]
    pub const fn nil() -> Self {
        Self(WrappedUlid::nil())
    }

    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(WrappedUlid::from_bytes(bytes))
    }

    #[must_use]
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0.to_bytes()
    }

    pub fn try_from_bytes(bytes: &[u8]) -> Result<Self, GuidDecodeError> {
        let array: [u8; 16] = bytes
            .try_into()
            .map_err(|_| GuidDecodeError::InvalidSize { len: bytes.len() })?;

        Ok(Self::from_bytes(array))
    }

    #[must_use]
    pub const fn from_u128(n: u128) -> Self {
        Self(WrappedUlid::from_bytes(n.to_be_bytes()))
    }

    #[must_use]
    pub const fn as_u128(self) -> u128 {
        self.0.0
    }

    /// A fresh, process-local GUID. Callers that need determinism (tests,
    /// fixtures) should prefer `from_u128`/`from_bytes`.
    #[must_use]
    pub fn generate() -> Self {
        Self(WrappedUlid::new())
    }
}

impl Serialize for Guid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.to_string().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Guid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        WrappedUlid::from_string(&text)
            .map(Self)
            .map_err(|_| serde::de::Error::custom("invalid guid string"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_bytes() {
        let guid = Guid::from_u128(0xdead_beef);
        let bytes = guid.to_bytes();

        assert_eq!(Guid::try_from_bytes(&bytes).unwrap(), guid);
    }

    #[test]
    fn ordering_matches_u128_ordering() {
        let a = Guid::from_u128(1);
        let b = Guid::from_u128(2);

        assert!(a < b);
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(Guid::try_from_bytes(&[0u8; 8]).is_err());
    }
}
