use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::trade::types::{ItemNumber, Price, UserId};

/// What a holding record says about the item
#[derive(
    Clone, Copy, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// The user has the item and is not offering it
    #[display("owned")]
    Owned,
    /// The user has spare copies to trade or sell
    #[display("duplicate")]
    Duplicate,
    /// The user wants the item
    #[display("wishlist")]
    Wishlist,
}

/// One inventory row as it comes from the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    /// Owner of the row
    pub user_id: UserId,
    /// Sticker number
    pub item: ItemNumber,
    /// Row status
    pub status: Status,
    /// Asking price, only meaningful for duplicates
    #[serde(default)]
    pub price: Price,
    /// Spare copies, only meaningful for duplicates
    #[serde(default = "one")]
    pub quantity: u32,
}

/// Serde default for `Holding::quantity`
const fn one() -> u32 {
    1
}

impl Holding {
    /// An `owned` row
    #[must_use]
    pub const fn owned(user_id: UserId, item: ItemNumber) -> Self {
        Self {
            user_id,
            item,
            status: Status::Owned,
            price: 0,
            quantity: 1,
        }
    }

    /// A `wishlist` row
    #[must_use]
    pub const fn wishlist(user_id: UserId, item: ItemNumber) -> Self {
        Self {
            user_id,
            item,
            status: Status::Wishlist,
            price: 0,
            quantity: 1,
        }
    }

    /// A `duplicate` row. A zero `price` offers the copies for trade only.
    #[must_use]
    pub const fn duplicate(user_id: UserId, item: ItemNumber, price: Price, quantity: u32) -> Self {
        Self {
            user_id,
            item,
            status: Status::Duplicate,
            price,
            quantity,
        }
    }

    /// The listing carried by a duplicate row
    #[must_use]
    pub const fn listing(&self) -> Listing {
        Listing {
            price: self.price,
            quantity: self.quantity,
        }
    }
}

/// Terms under which a user offers spare copies of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// Zero for trade only, otherwise the asking price
    pub price: Price,
    /// Spare copies available
    pub quantity: u32,
}

impl Listing {
    /// Trade-only listing with the given number of copies
    #[must_use]
    pub const fn trade(quantity: u32) -> Self {
        Self { price: 0, quantity }
    }

    /// Listing for sale with the given number of copies
    #[must_use]
    pub const fn sale(price: Price, quantity: u32) -> Self {
        Self { price, quantity }
    }

    /// Whether the copies are sold for money rather than swapped
    #[must_use]
    pub const fn is_for_sale(&self) -> bool {
        self.price > 0
    }
}
