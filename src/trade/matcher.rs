//! Direct trades and cash sales between the caller and the rest of the market.
//!
//! The caller's own inventory is always read fresh from the store, so a stale
//! market snapshot can never offer the caller something they already own.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use log::{debug, warn};
use serde::Serialize;

use super::inventory::UserInventory;
use super::market::{MarketRow, MarketSnapshot};
use super::types::{ItemNumber, Price, UserId};
use crate::models::Profile;
use crate::store::{InventoryStore, StoreError};

/// What the caller hands over in exchange for the offered item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Deal {
    /// Reciprocal swap: the caller gives `give` from their duplicates
    Swap {
        /// Item the caller gives back
        give: ItemNumber,
    },
    /// One-way purchase at the asking price
    Sale {
        /// Asking price
        price: Price,
    },
}

/// A proposed trade with one other user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    /// The user offering the item
    pub counterparty: UserId,
    /// Their profile
    pub profile: Profile,
    /// Item the caller would receive
    pub item: ItemNumber,
    /// Swap or sale terms
    pub deal: Deal,
    /// Whether `item` is on the caller's wishlist
    pub is_wishlist: bool,
}

impl Match {
    /// Asking price, zero for swaps
    #[must_use]
    pub const fn price(&self) -> Price {
        match self.deal {
            Deal::Sale { price } => price,
            Deal::Swap { .. } => 0,
        }
    }

    /// Item the caller gives back, for swaps
    #[must_use]
    pub const fn give(&self) -> Option<ItemNumber> {
        match self.deal {
            Deal::Swap { give } => Some(give),
            Deal::Sale { .. } => None,
        }
    }

    /// Counterparty reputation
    #[must_use]
    pub const fn reputation(&self) -> i64 {
        self.profile.reputation
    }

    /// Ranking keys shared by both lists: wishlist items first, then the
    /// list-specific keys, then counterparty and item so ties never depend on row order.
    fn rank(&self, other: &Self, by_price: bool) -> Ordering {
        let price = if by_price {
            self.price().cmp(&other.price())
        } else {
            Ordering::Equal
        };
        other
            .is_wishlist
            .cmp(&self.is_wishlist)
            .then(price)
            .then(other.reputation().cmp(&self.reputation()))
            .then(self.counterparty.cmp(&other.counterparty))
            .then(self.item.cmp(&other.item))
    }
}

/// Ranked trade opportunities for one caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Matches {
    /// Swaps, wishlist items first, then by reputation
    pub direct_trades: Vec<Match>,
    /// Sales, wishlist items first, then cheapest, then by reputation
    pub cash_sales: Vec<Match>,
}

impl Matches {
    /// Neither list has entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.direct_trades.is_empty() && self.cash_sales.is_empty()
    }
}

/// Matches the caller's inventory against a market snapshot.
///
/// Offers of items the caller owns are skipped. Priced offers become cash
/// sales. Free offers become swaps when the caller has a duplicate the
/// offering user does not own; the lowest such item number is proposed.
///
/// # Arguments
///
/// * `caller` - The caller's id, rows belonging to it are ignored
/// * `me` - The caller's current inventory
/// * `market` - Holdings of the other users
///
/// # Returns
///
/// Both lists, already ranked
#[must_use]
pub fn match_inventory(caller: UserId, me: &UserInventory, market: &MarketSnapshot) -> Matches {
    let mut matches = Matches::default();
    if market.is_empty() {
        return matches;
    }

    let nothing = BTreeSet::new();
    for offer in market.offers() {
        let MarketRow { holding, profile } = offer;
        if holding.user_id == caller || me.owns(holding.item) {
            continue;
        }

        let is_wishlist = me.wants(holding.item);
        if holding.price > 0 {
            matches.cash_sales.push(Match {
                counterparty: holding.user_id,
                profile: profile.clone(),
                item: holding.item,
                deal: Deal::Sale {
                    price: holding.price,
                },
                is_wishlist,
            });
            continue;
        }

        let theirs = market.owned_by(holding.user_id).unwrap_or(&nothing);
        match me.duplicates.keys().copied().find(|item| !theirs.contains(item)) {
            Some(give) => matches.direct_trades.push(Match {
                counterparty: holding.user_id,
                profile: profile.clone(),
                item: holding.item,
                deal: Deal::Swap { give },
                is_wishlist,
            }),
            None => debug!(
                "No reciprocal item for #{} offered by {}",
                holding.item, holding.user_id
            ),
        }
    }

    matches.direct_trades.sort_by(|a, b| a.rank(b, false));
    matches.cash_sales.sort_by(|a, b| a.rank(b, true));
    matches
}

/// Finds direct trades and cash sales for a user
pub struct Matcher<'a, S: ?Sized> {
    /// Source of the caller's fresh inventory
    store: &'a S,
}

impl<'a, S: InventoryStore + ?Sized> Matcher<'a, S> {
    /// Creates a matcher reading from `store`
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Matches `user` against `market`, reporting store failures.
    ///
    /// # Errors
    ///
    /// * If the caller's inventory cannot be read
    pub fn try_find_matches(
        &self,
        user: UserId,
        market: &MarketSnapshot,
    ) -> Result<Matches, StoreError> {
        if market.is_empty() {
            return Ok(Matches::default());
        }
        let me = self.store.get_my_inventory(user)?;
        let matches = match_inventory(user, &me, market);
        debug!(
            "User {user}: {} direct trades, {} cash sales",
            matches.direct_trades.len(),
            matches.cash_sales.len()
        );
        Ok(matches)
    }

    /// Matches `user` against `market`. A store failure yields no matches.
    pub fn find_matches(&self, user: UserId, market: &MarketSnapshot) -> Matches {
        self.try_find_matches(user, market).unwrap_or_else(|e| {
            warn!("Matching for user {user} failed: {e}");
            Matches::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Holding, Member};
    use crate::store::InMemoryStore;
    use crate::trade::test_helpers::*;

    fn me() -> Member {
        member(1, "Yo", "Mendoza", "Centro", 0)
    }

    fn items(list: &[Match]) -> Vec<ItemNumber> {
        list.iter().map(|m| m.item).collect()
    }

    /// Scenario: the other user already owns what I'd give, except #4
    #[test]
    fn test_direct_trade_for_wishlist_item() {
        let me = me();
        let u = member(2, "Dibu", "Mendoza", "Centro", 3);
        let store = store(
            &[&me, &u],
            &[
                Holding::owned(me.id, 1),
                Holding::owned(me.id, 2),
                Holding::wishlist(me.id, 3),
                Holding::duplicate(me.id, 4, 0, 1),
                Holding::owned(u.id, 1),
                Holding::owned(u.id, 2),
                Holding::duplicate(u.id, 3, 0, 1),
            ],
        );
        let market = store.get_market_snapshot(me.id).unwrap();

        let matches = Matcher::new(&store).find_matches(me.id, &market);

        assert_eq!(matches.cash_sales, vec![]);
        assert_eq!(matches.direct_trades.len(), 1);
        let trade = &matches.direct_trades[0];
        assert_eq!(trade.item, 3);
        assert_eq!(trade.give(), Some(4));
        assert_eq!(trade.counterparty, u.id);
        assert!(trade.is_wishlist);
    }

    #[test]
    fn test_priced_offer_is_cash_sale() {
        let me = me();
        let u = member(2, "Dibu", "Mendoza", "Centro", 0);
        let snapshot = market(&[(&u, Holding::duplicate(u.id, 5, 200, 1))]);
        let mine = UserInventory::from_holdings(&[Holding::duplicate(me.id, 4, 0, 1)]);

        let matches = match_inventory(me.id, &mine, &snapshot);

        assert_eq!(matches.direct_trades, vec![]);
        assert_eq!(matches.cash_sales.len(), 1);
        assert_eq!(matches.cash_sales[0].item, 5);
        assert_eq!(matches.cash_sales[0].price(), 200);
        assert_eq!(matches.cash_sales[0].give(), None);
    }

    #[test]
    fn test_owned_items_are_excluded() {
        let me = me();
        let u = member(2, "Dibu", "Mendoza", "Centro", 0);
        let snapshot = market(&[
            (&u, Holding::duplicate(u.id, 7, 0, 1)),
            (&u, Holding::duplicate(u.id, 8, 150, 1)),
        ]);
        let mine = UserInventory::from_holdings(&[
            Holding::owned(me.id, 7),
            Holding::duplicate(me.id, 8, 0, 1),
            Holding::duplicate(me.id, 4, 0, 1),
        ]);

        let matches = match_inventory(me.id, &mine, &snapshot);

        assert!(matches.is_empty());
    }

    #[test]
    fn test_no_swap_without_reciprocal_item() {
        let me = me();
        let u = member(2, "Dibu", "Mendoza", "Centro", 0);
        let snapshot = market(&[
            (&u, Holding::owned(u.id, 4)),
            (&u, Holding::duplicate(u.id, 3, 0, 1)),
        ]);
        let mine = UserInventory::from_holdings(&[Holding::duplicate(me.id, 4, 0, 1)]);

        assert!(match_inventory(me.id, &mine, &snapshot).is_empty());

        let no_duplicates = UserInventory::from_holdings(&[Holding::owned(me.id, 1)]);
        assert!(match_inventory(me.id, &no_duplicates, &snapshot).is_empty());
    }

    #[test]
    fn test_give_back_is_lowest_item_they_lack() {
        let me = me();
        let u = member(2, "Dibu", "Mendoza", "Centro", 0);
        let snapshot = market(&[
            (&u, Holding::owned(u.id, 11)),
            (&u, Holding::duplicate(u.id, 3, 0, 1)),
        ]);
        let mine = UserInventory::from_holdings(&[
            Holding::duplicate(me.id, 40, 0, 1),
            Holding::duplicate(me.id, 11, 0, 1),
            Holding::duplicate(me.id, 25, 0, 1),
        ]);

        let matches = match_inventory(me.id, &mine, &snapshot);

        assert_eq!(matches.direct_trades[0].give(), Some(25));
    }

    #[test]
    fn test_wishlist_first_then_reputation() {
        let me = me();
        let low = member(2, "Low", "Mendoza", "Centro", 1);
        let high = member(3, "High", "Mendoza", "Centro", 9);
        let snapshot = market(&[
            (&low, Holding::duplicate(low.id, 30, 0, 1)),
            (&high, Holding::duplicate(high.id, 31, 0, 1)),
            (&low, Holding::duplicate(low.id, 32, 0, 1)),
        ]);
        let mine = UserInventory::from_holdings(&[
            Holding::duplicate(me.id, 4, 0, 1),
            Holding::wishlist(me.id, 32),
        ]);

        let matches = match_inventory(me.id, &mine, &snapshot);

        assert_eq!(items(&matches.direct_trades), vec![32, 31, 30]);
        assert!(matches.direct_trades[0].is_wishlist);
    }

    #[test]
    fn test_cash_sales_wishlist_then_price_then_reputation() {
        let me = me();
        let a = member(2, "A", "Mendoza", "Centro", 1);
        let b = member(3, "B", "Mendoza", "Centro", 9);
        let snapshot = market(&[
            (&a, Holding::duplicate(a.id, 50, 100, 1)),
            (&b, Holding::duplicate(b.id, 51, 100, 1)),
            (&a, Holding::duplicate(a.id, 52, 50, 1)),
            (&b, Holding::duplicate(b.id, 53, 900, 1)),
        ]);
        let mine = UserInventory::from_holdings(&[Holding::wishlist(me.id, 53)]);

        let matches = match_inventory(me.id, &mine, &snapshot);

        assert_eq!(items(&matches.cash_sales), vec![53, 52, 51, 50]);
    }

    #[test]
    fn test_ranking_ignores_row_order() {
        let me = me();
        let a = member(2, "A", "Mendoza", "Centro", 5);
        let b = member(3, "B", "Mendoza", "Centro", 5);
        let rows = [
            (&a, Holding::duplicate(a.id, 60, 0, 1)),
            (&b, Holding::duplicate(b.id, 60, 0, 1)),
            (&b, Holding::duplicate(b.id, 61, 10, 1)),
            (&a, Holding::duplicate(a.id, 61, 10, 1)),
        ];
        let mut reversed = rows.clone();
        reversed.reverse();
        let mine = UserInventory::from_holdings(&[Holding::duplicate(me.id, 4, 0, 1)]);

        let forward = match_inventory(me.id, &mine, &market(&rows));
        let backward = match_inventory(me.id, &mine, &market(&reversed));

        assert_eq!(forward, backward);
        assert_eq!(forward, match_inventory(me.id, &mine, &market(&rows)));
        assert_eq!(forward.direct_trades[0].counterparty, a.id);
    }

    #[test]
    fn test_empty_market() {
        let store = InMemoryStore::new();
        let matches = Matcher::new(&store).find_matches(UserId(1), &MarketSnapshot::default());
        assert!(matches.is_empty());
    }

    #[test]
    fn test_unknown_caller_fails_soft() {
        let store = InMemoryStore::new();
        let u = member(2, "Dibu", "Mendoza", "Centro", 0);
        let snapshot = market(&[(&u, Holding::duplicate(u.id, 5, 200, 1))]);
        let matcher = Matcher::new(&store);

        assert!(matcher.try_find_matches(UserId(1), &snapshot).is_err());
        assert!(matcher.find_matches(UserId(1), &snapshot).is_empty());
    }
}
