use std::collections::{BTreeMap, BTreeSet};

use super::inventory::UserInventory;
use super::market::{MarketRow, MarketSnapshot};
use super::types::{ItemNumber, UserId};
use crate::models::{Holding, Locality, Member, Profile};
use crate::store::{InMemoryStore, InventoryStore, StoreError};

pub fn member(id: u64, nick: &str, province: &str, zone: &str, reputation: i64) -> Member {
    Member {
        id: UserId(id),
        profile: Profile {
            nick: nick.to_string(),
            locality: Locality::new(province, zone),
            contact: format!("26100000{id:02}"),
            reputation,
        },
    }
}

pub fn market(rows: &[(&Member, Holding)]) -> MarketSnapshot {
    MarketSnapshot::new(
        rows.iter()
            .map(|(member, holding)| MarketRow {
                holding: holding.clone(),
                profile: member.profile.clone(),
            })
            .collect(),
    )
}

pub fn store(members: &[&Member], holdings: &[Holding]) -> InMemoryStore {
    let store = InMemoryStore::new();
    for member in members {
        store.register_member((*member).clone()).unwrap();
    }
    for holding in holdings {
        store.upsert_holding(holding.clone()).unwrap();
    }
    store
}

/// A store whose every read fails, standing in for an unreachable backend
pub struct UnavailableStore;

impl InventoryStore for UnavailableStore {
    fn get_my_inventory(&self, _user: UserId) -> Result<UserInventory, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    fn get_market_snapshot(&self, _excluding: UserId) -> Result<MarketSnapshot, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    fn get_holders_of_item(&self, _item: ItemNumber) -> Result<Vec<Member>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    fn get_wishlists_of_users(
        &self,
        _users: &[UserId],
    ) -> Result<BTreeMap<UserId, BTreeSet<ItemNumber>>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}
