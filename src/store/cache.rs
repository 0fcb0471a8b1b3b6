use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use log::debug;

use super::{InventoryStore, StoreError};
use crate::models::Member;
use crate::trade::inventory::UserInventory;
use crate::trade::market::MarketSnapshot;
use crate::trade::types::{ItemNumber, UserId};

/// Store wrapper that reuses market snapshots for up to `ttl`.
///
/// Only [`InventoryStore::get_market_snapshot`] is cached. The caller's own
/// inventory and the triangulation queries always reach the inner store.
#[derive(Debug)]
pub struct CachedStore<S> {
    inner: S,
    ttl: Duration,
    snapshots: Mutex<HashMap<UserId, (Instant, MarketSnapshot)>>,
}

impl<S: InventoryStore> CachedStore<S> {
    /// Wraps `inner`, keeping each snapshot for `ttl`
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            snapshots: Mutex::new(HashMap::new()),
        }
    }

    /// The wrapped store
    pub const fn inner(&self) -> &S {
        &self.inner
    }

    /// Number of snapshots currently held
    ///
    /// # Errors
    ///
    /// * If the cache lock is poisoned
    pub fn cached_len(&self) -> Result<usize, StoreError> {
        Ok(self
            .snapshots
            .lock()
            .map_err(|_| StoreError::LockPoisoned("cached_len"))?
            .len())
    }

    /// Drops every cached snapshot.
    ///
    /// # Errors
    ///
    /// * If the cache lock is poisoned
    pub fn invalidate(&self) -> Result<(), StoreError> {
        self.snapshots
            .lock()
            .map_err(|_| StoreError::LockPoisoned("invalidate"))?
            .clear();
        Ok(())
    }
}

impl<S: InventoryStore> InventoryStore for CachedStore<S> {
    fn get_my_inventory(&self, user: UserId) -> Result<UserInventory, StoreError> {
        self.inner.get_my_inventory(user)
    }

    fn get_market_snapshot(&self, excluding: UserId) -> Result<MarketSnapshot, StoreError> {
        let mut snapshots = self
            .snapshots
            .lock()
            .map_err(|_| StoreError::LockPoisoned("get_market_snapshot"))?;
        if let Some((taken, snapshot)) = snapshots.get(&excluding) {
            if taken.elapsed() < self.ttl {
                debug!("Serving cached market for user {excluding}");
                return Ok(snapshot.clone());
            }
        }

        let snapshot = self.inner.get_market_snapshot(excluding)?;
        snapshots.retain(|_, (taken, _)| taken.elapsed() < self.ttl);
        if !self.ttl.is_zero() {
            snapshots.insert(excluding, (Instant::now(), snapshot.clone()));
        }
        Ok(snapshot)
    }

    fn get_holders_of_item(&self, item: ItemNumber) -> Result<Vec<Member>, StoreError> {
        self.inner.get_holders_of_item(item)
    }

    fn get_wishlists_of_users(
        &self,
        users: &[UserId],
    ) -> Result<BTreeMap<UserId, BTreeSet<ItemNumber>>, StoreError> {
        self.inner.get_wishlists_of_users(users)
    }
}
