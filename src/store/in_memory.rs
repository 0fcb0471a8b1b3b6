//! `BTreeMap`-backed inventory store for the CLI, benchmarks and tests.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::debug;
use serde::{Deserialize, Serialize};

use super::ledger::TradeRequest;
use super::{InventoryStore, StoreError};
use crate::models::{Holding, Listing, Member, Profile, Status};
use crate::trade::inventory::UserInventory;
use crate::trade::market::{MarketRow, MarketSnapshot};
use crate::trade::types::{ItemNumber, UserId};

/// A holding plus the version written with it
#[derive(Debug, Clone)]
pub(super) struct StoredHolding {
    /// The row
    pub(super) holding: Holding,
    /// Store-wide monotonic version of the last write to this row
    pub(super) version: u64,
}

/// One row per (user, item, status)
type RowKey = (UserId, ItemNumber, Status);

/// All tables behind the store lock
#[derive(Debug, Default)]
pub(super) struct Tables {
    /// Profiles by user
    pub(super) members: BTreeMap<UserId, Profile>,
    /// Inventory rows
    pub(super) holdings: BTreeMap<RowKey, StoredHolding>,
    /// Trade requests awaiting or past confirmation
    pub(super) requests: BTreeMap<u64, TradeRequest>,
    /// (voter, target) pairs already counted
    pub(super) votes: BTreeSet<(UserId, UserId)>,
    /// Last version handed out
    last_version: u64,
    /// Last request id handed out
    last_request_id: u64,
}

impl Tables {
    fn next_version(&mut self) -> u64 {
        self.last_version += 1;
        self.last_version
    }

    pub(super) fn next_request_id(&mut self) -> u64 {
        self.last_request_id += 1;
        self.last_request_id
    }

    pub(super) fn member(&self, user: UserId) -> Result<&Profile, StoreError> {
        self.members
            .get(&user)
            .ok_or_else(|| StoreError::NotFound(format!("user {user}")))
    }

    /// Inserts or replaces a row under a fresh version
    pub(super) fn put(&mut self, holding: Holding) {
        let version = self.next_version();
        self.holdings.insert(
            (holding.user_id, holding.item, holding.status),
            StoredHolding { holding, version },
        );
    }

    pub(super) fn row(
        &self,
        user: UserId,
        item: ItemNumber,
        status: Status,
    ) -> Option<&StoredHolding> {
        self.holdings.get(&(user, item, status))
    }

    pub(super) fn rows_of(&self, user: UserId) -> impl Iterator<Item = &Holding> {
        self.holdings
            .range(
                (user, ItemNumber::MIN, Status::Owned)..=(user, ItemNumber::MAX, Status::Wishlist),
            )
            .map(|(_, stored)| &stored.holding)
    }

    /// Version of the user's duplicate row for `item`
    pub(super) fn duplicate_version(
        &self,
        user: UserId,
        item: ItemNumber,
    ) -> Result<&StoredHolding, StoreError> {
        self.row(user, item, Status::Duplicate)
            .ok_or_else(|| StoreError::NotFound(format!("duplicate #{item} of user {user}")))
    }

    /// Hands over one spare copy if the row is still at `expected_version`.
    /// The row is deleted when its last copy goes.
    pub(super) fn take_duplicate(
        &mut self,
        user: UserId,
        item: ItemNumber,
        expected_version: u64,
    ) -> Result<u32, StoreError> {
        let stored = self.duplicate_version(user, item)?;
        if stored.version != expected_version {
            return Err(StoreError::Conflict {
                user,
                item,
                expected: expected_version,
                found: stored.version,
            });
        }

        let remaining = stored.holding.quantity.saturating_sub(1);
        if remaining == 0 {
            self.holdings.remove(&(user, item, Status::Duplicate));
        } else {
            let mut holding = stored.holding.clone();
            holding.quantity = remaining;
            self.put(holding);
        }
        debug!("User {user} handed over #{item}, {remaining} spare left");
        Ok(remaining)
    }

    /// The user now has `item`: it leaves the wishlist and is recorded as owned
    pub(super) fn receive(&mut self, user: UserId, item: ItemNumber) {
        self.holdings.remove(&(user, item, Status::Wishlist));
        if self.row(user, item, Status::Owned).is_none() {
            self.put(Holding::owned(user, item));
        }
    }
}

/// Initial contents of an [`InMemoryStore`], usually read from JSON
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSeed {
    /// Registered users
    #[serde(default)]
    pub members: Vec<Member>,
    /// Their inventory rows
    #[serde(default)]
    pub holdings: Vec<Holding>,
}

/// In-memory inventory store.
///
/// Clone-friendly via `Arc`; every clone sees the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    /// Shared tables
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the seed's members and rows.
    ///
    /// # Errors
    ///
    /// * If a holding belongs to an unregistered user or is malformed
    pub fn from_seed(seed: StoreSeed) -> Result<Self, StoreError> {
        let store = Self::new();
        for member in seed.members {
            store.register_member(member)?;
        }
        for holding in seed.holdings {
            store.upsert_holding(holding)?;
        }
        Ok(store)
    }

    pub(super) fn read(
        &self,
        operation: &'static str,
    ) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::LockPoisoned(operation))
    }

    pub(super) fn write(
        &self,
        operation: &'static str,
    ) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::LockPoisoned(operation))
    }

    /// Registers a user or replaces their profile.
    ///
    /// # Errors
    ///
    /// * If the store lock is poisoned
    pub fn register_member(&self, member: Member) -> Result<(), StoreError> {
        self.write("register_member")?
            .members
            .insert(member.id, member.profile);
        Ok(())
    }

    /// A registered user with their current profile.
    ///
    /// # Errors
    ///
    /// * If the user is not registered
    pub fn member(&self, user: UserId) -> Result<Member, StoreError> {
        let tables = self.read("member")?;
        Ok(Member {
            id: user,
            profile: tables.member(user)?.clone(),
        })
    }

    /// Inserts or replaces a single row.
    ///
    /// # Errors
    ///
    /// * If the owner is not registered
    /// * If the item number is zero or a duplicate has no copies
    pub fn upsert_holding(&self, holding: Holding) -> Result<(), StoreError> {
        let mut tables = self.write("upsert_holding")?;
        tables.member(holding.user_id)?;
        validate(&holding)?;
        tables.put(holding);
        Ok(())
    }

    /// Replaces everything the user has recorded inside one album section.
    ///
    /// Rows of the user with an item in `section` are deleted, then the new
    /// rows are inserted. Duplicates are also recorded as owned. Wishlist
    /// entries for items the user has are dropped.
    ///
    /// # Arguments
    ///
    /// * `user` - Owner of the rows
    /// * `section` - Item range being edited
    /// * `owned` - Items the user has
    /// * `wishlist` - Items the user wants
    /// * `duplicates` - Items with spare copies and their terms
    ///
    /// # Returns
    ///
    /// Number of rows written
    ///
    /// # Errors
    ///
    /// * If the user is not registered
    /// * If an item lies outside `section` or a duplicate has no copies.
    ///   Nothing is deleted in that case.
    pub fn save_section(
        &self,
        user: UserId,
        section: RangeInclusive<ItemNumber>,
        owned: &[ItemNumber],
        wishlist: &[ItemNumber],
        duplicates: &[(ItemNumber, Listing)],
    ) -> Result<usize, StoreError> {
        let mut rows: Vec<Holding> = Vec::new();
        for &(item, listing) in duplicates {
            rows.push(Holding::duplicate(user, item, listing.price, listing.quantity));
            rows.push(Holding::owned(user, item));
        }
        rows.extend(owned.iter().map(|&item| Holding::owned(user, item)));
        let has: BTreeSet<ItemNumber> = rows.iter().map(|h| h.item).collect();
        rows.extend(
            wishlist
                .iter()
                .filter(|item| !has.contains(item))
                .map(|&item| Holding::wishlist(user, item)),
        );

        for holding in &rows {
            if !section.contains(&holding.item) {
                return Err(StoreError::Rejected(format!(
                    "#{} is outside section {}..={}",
                    holding.item,
                    section.start(),
                    section.end()
                )));
            }
            validate(holding)?;
        }

        let mut tables = self.write("save_section")?;
        tables.member(user)?;
        tables
            .holdings
            .retain(|(owner, item, _), _| *owner != user || !section.contains(item));
        let before = tables.holdings.len();
        for holding in rows {
            tables.put(holding);
        }
        let written = tables.holdings.len() - before;
        debug!(
            "User {user} saved section {}..={}: {written} rows",
            section.start(),
            section.end()
        );
        Ok(written)
    }

    /// Terms and current version of the user's duplicate row for `item`.
    ///
    /// # Errors
    ///
    /// * If the user has no spare copy of `item`
    pub fn duplicate_version(
        &self,
        user: UserId,
        item: ItemNumber,
    ) -> Result<(Listing, u64), StoreError> {
        let tables = self.read("duplicate_version")?;
        let stored = tables.duplicate_version(user, item)?;
        Ok((stored.holding.listing(), stored.version))
    }

    /// Compare-and-swap decrement of a duplicate row.
    ///
    /// # Returns
    ///
    /// Spare copies left, zero when the row was deleted
    ///
    /// # Errors
    ///
    /// * If the row is gone
    /// * If the row changed since `expected_version` was read
    pub fn take_duplicate(
        &self,
        user: UserId,
        item: ItemNumber,
        expected_version: u64,
    ) -> Result<u32, StoreError> {
        self.write("take_duplicate")?
            .take_duplicate(user, item, expected_version)
    }
}

/// Row-level rules shared by every write path
fn validate(holding: &Holding) -> Result<(), StoreError> {
    if holding.item == 0 {
        return Err(StoreError::Rejected("sticker numbers start at 1".to_string()));
    }
    if holding.status == Status::Duplicate && holding.quantity == 0 {
        return Err(StoreError::Rejected(format!(
            "duplicate #{} needs at least one copy",
            holding.item
        )));
    }
    Ok(())
}

impl InventoryStore for InMemoryStore {
    fn get_my_inventory(&self, user: UserId) -> Result<UserInventory, StoreError> {
        let tables = self.read("get_my_inventory")?;
        tables.member(user)?;
        Ok(UserInventory::from_holdings(tables.rows_of(user)))
    }

    fn get_market_snapshot(&self, excluding: UserId) -> Result<MarketSnapshot, StoreError> {
        let tables = self.read("get_market_snapshot")?;
        let rows = tables
            .holdings
            .values()
            .filter(|stored| stored.holding.user_id != excluding)
            .filter_map(|stored| {
                tables
                    .members
                    .get(&stored.holding.user_id)
                    .map(|profile| MarketRow {
                        holding: stored.holding.clone(),
                        profile: profile.clone(),
                    })
            })
            .collect();
        Ok(MarketSnapshot::new(rows))
    }

    fn get_holders_of_item(&self, item: ItemNumber) -> Result<Vec<Member>, StoreError> {
        let tables = self.read("get_holders_of_item")?;
        Ok(tables
            .holdings
            .values()
            .map(|stored| &stored.holding)
            .filter(|h| h.item == item && h.status == Status::Duplicate)
            .filter_map(|h| {
                tables.members.get(&h.user_id).map(|profile| Member {
                    id: h.user_id,
                    profile: profile.clone(),
                })
            })
            .collect())
    }

    fn get_wishlists_of_users(
        &self,
        users: &[UserId],
    ) -> Result<BTreeMap<UserId, BTreeSet<ItemNumber>>, StoreError> {
        let tables = self.read("get_wishlists_of_users")?;
        Ok(users
            .iter()
            .map(|&user| {
                let wishlist: BTreeSet<ItemNumber> = tables
                    .rows_of(user)
                    .filter(|h| h.status == Status::Wishlist)
                    .map(|h| h.item)
                    .collect();
                (user, wishlist)
            })
            .filter(|(_, wishlist)| !wishlist.is_empty())
            .collect())
    }
}
