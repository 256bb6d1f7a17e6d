use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// PdbId
///
/// A dense, non-negative integer assigned to a primitive in insertion
/// order. IDs are the join key inside the iterator algebra; GUIDs are
/// resolved to a `PdbId` only through the primitive store.
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[repr(transparent)]
pub struct PdbId(u64);

impl PdbId {
    pub const ZERO: Self = Self(0);
    pub const MAX: Self = Self(u64::MAX);

    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    #[must_use]
    pub const fn prev(self) -> Self {
        Self(self.0 - 1)
    }

    #[must_use]
    pub const fn checked_next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }
}

impl From<u64> for PdbId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<PdbId> for u64 {
    fn from(id: PdbId) -> Self {
        id.0
    }
}
