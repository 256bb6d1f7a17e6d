use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// Timestamp
/// Seconds since the Unix epoch.
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[repr(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    #[must_use]
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs)
    }

    #[must_use]
    pub const fn as_secs(self) -> i64 {
        self.0
    }

    #[must_use]
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp())
    }
}
