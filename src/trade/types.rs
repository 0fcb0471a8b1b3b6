use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Type alias for a sticker number. Unique within an album, no sub-variants.
pub type ItemNumber = u32;

/// Type alias for an asking price in whole currency units. Zero means "trade only".
pub type Price = u32;

/// Identifier of a marketplace user
#[derive(
    Clone, Copy, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}
