use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};

use super::bridge::BridgeChain;
use super::types::{ItemNumber, UserId};
use crate::models::Member;
use crate::store::{InventoryStore, StoreError};
use crate::utils::constants::MAX_BRIDGE_CHAINS;

/// Searches for three-party chains that unlock a trade no direct swap can.
///
/// Candidates are visited in ascending user id and item order, so the first
/// chains found, and therefore the capped result, are deterministic.
pub struct Triangulator<'a, S: ?Sized> {
    /// Source of holders, wishlists and the market snapshot
    store: &'a S,
    /// Maximum number of chains returned
    limit: usize,
}

impl<'a, S: InventoryStore + ?Sized> Triangulator<'a, S> {
    /// Creates a triangulator returning at most `MAX_BRIDGE_CHAINS` chains
    pub const fn new(store: &'a S) -> Self {
        Self {
            store,
            limit: MAX_BRIDGE_CHAINS,
        }
    }

    /// Lowers the cap. Values above `MAX_BRIDGE_CHAINS` are clamped to it.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.min(MAX_BRIDGE_CHAINS);
        self
    }

    /// Finds chains `me -> bridge -> target-holder -> me` delivering `target_item`.
    ///
    /// Target-holders and bridges must share the caller's province and zone.
    ///
    /// # Arguments
    ///
    /// * `me` - The caller and their locality
    /// * `target_item` - The item the caller wants
    /// * `my_duplicates` - Items the caller can give away
    ///
    /// # Errors
    ///
    /// * If any of the store reads fails
    pub fn try_find_bridges(
        &self,
        me: &Member,
        target_item: ItemNumber,
        my_duplicates: &BTreeSet<ItemNumber>,
    ) -> Result<Vec<BridgeChain>, StoreError> {
        let mut chains = Vec::new();
        if self.limit == 0 || my_duplicates.is_empty() {
            return Ok(chains);
        }

        let targets: BTreeMap<UserId, Member> = self
            .store
            .get_holders_of_item(target_item)?
            .into_iter()
            .filter(|holder| holder.id != me.id)
            .filter(|holder| holder.profile.locality.matches(&me.profile.locality))
            .map(|holder| (holder.id, holder))
            .collect();
        if targets.is_empty() {
            debug!("No nearby holders of #{target_item} for {me}");
            return Ok(chains);
        }

        let target_ids: Vec<UserId> = targets.keys().copied().collect();
        let wishlists = self.store.get_wishlists_of_users(&target_ids)?;
        let needed_by_targets: BTreeSet<ItemNumber> =
            wishlists.values().flatten().copied().collect();
        if needed_by_targets.is_empty() {
            debug!("Holders of #{target_item} want nothing");
            return Ok(chains);
        }

        let market = self.store.get_market_snapshot(me.id)?;
        for (bridge_id, inventory) in market.inventories() {
            if bridge_id == me.id {
                continue;
            }
            let Some(profile) = market.profile_of(bridge_id) else {
                continue;
            };
            if !profile.locality.matches(&me.profile.locality) {
                continue;
            }
            let Some(&bridge_wants) = inventory.wishlist.intersection(my_duplicates).next() else {
                continue;
            };

            let bridge = Member {
                id: bridge_id,
                profile: profile.clone(),
            };
            for &bridge_gives in inventory
                .duplicates
                .keys()
                .filter(|item| needed_by_targets.contains(item))
            {
                for (target_id, target) in &targets {
                    let wanted = wishlists
                        .get(target_id)
                        .is_some_and(|wishlist| wishlist.contains(&bridge_gives));
                    if !wanted {
                        continue;
                    }

                    match BridgeChain::new(
                        me.id,
                        bridge.clone(),
                        target.clone(),
                        bridge_wants,
                        bridge_gives,
                        target_item,
                    ) {
                        Ok(chain) => {
                            debug!("Found {chain}");
                            chains.push(chain);
                            if chains.len() >= self.limit {
                                return Ok(chains);
                            }
                        }
                        Err(e) => debug!("Skipping chain through {bridge}: {e}"),
                    }
                }
            }
        }

        Ok(chains)
    }

    /// Like `try_find_bridges`, but a store failure yields no chains
    pub fn find_bridges(
        &self,
        me: &Member,
        target_item: ItemNumber,
        my_duplicates: &BTreeSet<ItemNumber>,
    ) -> Vec<BridgeChain> {
        self.try_find_bridges(me, target_item, my_duplicates)
            .unwrap_or_else(|e| {
                warn!("Bridge search for #{target_item} by {me} failed: {e}");
                Vec::new()
            })
    }
}
