//! Inventory store collaborator.
//!
//! The matching engine only reads through [`InventoryStore`]. Writes happen
//! when a trade is confirmed and go through the ledger operations of
//! [`InMemoryStore`].

mod cache;
mod error;
mod in_memory;
mod ledger;

use std::collections::{BTreeMap, BTreeSet};

pub use cache::CachedStore;
pub use error::StoreError;
pub use in_memory::{InMemoryStore, StoreSeed};
pub use ledger::{RequestStatus, TradeKind, TradeRequest};

use crate::models::Member;
use crate::trade::inventory::UserInventory;
use crate::trade::market::MarketSnapshot;
use crate::trade::types::{ItemNumber, UserId};

/// Read side of the inventory store
pub trait InventoryStore {
    /// Current holdings of one user, partitioned by status.
    ///
    /// # Errors
    ///
    /// * If the store cannot be read or the user is unknown
    fn get_my_inventory(&self, user: UserId) -> Result<UserInventory, StoreError>;

    /// Every holding of every user except `excluding`, joined with profiles.
    /// May be stale.
    ///
    /// # Errors
    ///
    /// * If the store cannot be read
    fn get_market_snapshot(&self, excluding: UserId) -> Result<MarketSnapshot, StoreError>;

    /// Users holding `item` as a duplicate.
    ///
    /// # Errors
    ///
    /// * If the store cannot be read
    fn get_holders_of_item(&self, item: ItemNumber) -> Result<Vec<Member>, StoreError>;

    /// Wishlists of the given users. Users with an empty wishlist may be absent.
    ///
    /// # Errors
    ///
    /// * If the store cannot be read
    fn get_wishlists_of_users(
        &self,
        users: &[UserId],
    ) -> Result<BTreeMap<UserId, BTreeSet<ItemNumber>>, StoreError>;
}
