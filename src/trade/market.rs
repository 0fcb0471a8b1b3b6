use std::collections::{BTreeMap, BTreeSet, HashMap};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::inventory::UserInventory;
use super::types::{ItemNumber, UserId};
use crate::models::{Holding, Profile, Status};

/// A holding of another user joined with that user's profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketRow {
    /// The inventory row
    #[serde(flatten)]
    pub holding: Holding,
    /// Profile of the row's owner
    pub profile: Profile,
}

/// Every holding of every other user at one point in time.
///
/// Rebuilt for each matching call and allowed to be stale. Keeps an index of
/// each user's `owned` rows and profile so per-user lookups do not rescan the rows.
#[derive(Debug, Clone, Default)]
pub struct MarketSnapshot {
    /// Rows in store order
    rows: Vec<MarketRow>,
    /// Items held with status `owned`, per user
    owned_by_user: HashMap<UserId, BTreeSet<ItemNumber>>,
    /// First profile seen for each user
    profiles: HashMap<UserId, Profile>,
}

impl MarketSnapshot {
    /// Creates a snapshot from joined rows
    #[must_use]
    pub fn new(rows: Vec<MarketRow>) -> Self {
        let mut owned_by_user: HashMap<UserId, BTreeSet<ItemNumber>> = HashMap::new();
        let mut profiles: HashMap<UserId, Profile> = HashMap::new();
        for row in &rows {
            profiles
                .entry(row.holding.user_id)
                .or_insert_with(|| row.profile.clone());
            if row.holding.status == Status::Owned {
                owned_by_user
                    .entry(row.holding.user_id)
                    .or_default()
                    .insert(row.holding.item);
            }
        }
        Self {
            rows,
            owned_by_user,
            profiles,
        }
    }

    /// All rows
    #[must_use]
    pub fn rows(&self) -> &[MarketRow] {
        &self.rows
    }

    /// Number of rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// No rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows with status `duplicate`, which are the offers on the market
    pub fn offers(&self) -> impl Iterator<Item = &MarketRow> {
        self.rows
            .iter()
            .filter(|row| row.holding.status == Status::Duplicate)
    }

    /// Items the user holds with status `owned`. Duplicate rows are not included.
    #[must_use]
    pub fn owned_by(&self, user: UserId) -> Option<&BTreeSet<ItemNumber>> {
        self.owned_by_user.get(&user)
    }

    /// Profile attached to the user's rows
    #[must_use]
    pub fn profile_of(&self, user: UserId) -> Option<&Profile> {
        self.profiles.get(&user)
    }

    /// Inventories of every user in the snapshot, by ascending user id
    #[must_use]
    pub fn inventories(&self) -> BTreeMap<UserId, UserInventory> {
        self.rows
            .iter()
            .map(|row| (row.holding.user_id, &row.holding))
            .into_group_map()
            .into_iter()
            .map(|(user, holdings)| (user, UserInventory::from_holdings(holdings)))
            .collect()
    }
}

impl From<Vec<MarketRow>> for MarketSnapshot {
    fn from(rows: Vec<MarketRow>) -> Self {
        Self::new(rows)
    }
}
