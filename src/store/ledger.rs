//! Write side of the store: confirmed trades, pending requests and votes.
//!
//! Every operation runs under one write lock and decrements spare copies
//! through the versioned `take_duplicate`, so one spare copy can never be
//! handed to two buyers.

use log::info;
use serde::{Deserialize, Serialize};

use super::in_memory::Tables;
use super::{InMemoryStore, StoreError};
use crate::trade::bridge::BridgeChain;
use crate::trade::matcher::{Deal, Match};
use crate::trade::types::{ItemNumber, UserId};

/// Kind of trade a request records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeKind {
    /// Item for item
    Exchange,
    /// Item for money
    Purchase,
}

/// Lifecycle of a trade request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Waiting for the receiver to confirm
    Pending,
    /// Confirmed, both inventories updated
    Accepted,
}

/// A trade registered by one side and awaiting confirmation by the other
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRequest {
    /// Request id
    pub id: u64,
    /// User who registered the trade
    pub sender: UserId,
    /// User who must confirm it
    pub receiver: UserId,
    /// Item the sender handed over, `None` for purchases
    pub sent: Option<ItemNumber>,
    /// Item the sender received from the receiver
    pub received: ItemNumber,
    /// Exchange or purchase
    pub kind: TradeKind,
    /// Current state
    pub status: RequestStatus,
}

impl Tables {
    fn file_request(
        &mut self,
        sender: UserId,
        receiver: UserId,
        sent: Option<ItemNumber>,
        received: ItemNumber,
        kind: TradeKind,
    ) -> u64 {
        let id = self.next_request_id();
        self.requests.insert(
            id,
            TradeRequest {
                id,
                sender,
                receiver,
                sent,
                received,
                kind,
                status: RequestStatus::Pending,
            },
        );
        id
    }

    /// Current version of a spare copy the user is about to hand over
    fn spare_version(&self, user: UserId, item: ItemNumber) -> Result<u64, StoreError> {
        self.duplicate_version(user, item)
            .map(|stored| stored.version)
            .map_err(|_| StoreError::Rejected(format!("user {user} has no spare #{item}")))
    }
}

impl InMemoryStore {
    /// Records the caller's side of an accepted match and notifies the counterparty.
    ///
    /// # Returns
    ///
    /// Id of the request the counterparty has to confirm
    ///
    /// # Errors
    ///
    /// * If the caller no longer has the item they promised
    pub fn confirm_trade(&self, user: UserId, accepted: &Match) -> Result<u64, StoreError> {
        let request = match accepted.deal {
            Deal::Swap { give } => {
                self.register_exchange(user, give, accepted.item, Some(accepted.counterparty))?
            }
            Deal::Sale { .. } => {
                self.register_purchase(user, accepted.item, Some(accepted.counterparty))?
            }
        };
        request.ok_or_else(|| StoreError::Rejected("trade has no counterparty".to_string()))
    }

    /// The user gave `given` away and got `received` in return.
    ///
    /// # Returns
    ///
    /// Id of the request filed to `counterparty`, if one was given
    ///
    /// # Errors
    ///
    /// * If the user has no spare copy of `given`
    pub fn register_exchange(
        &self,
        user: UserId,
        given: ItemNumber,
        received: ItemNumber,
        counterparty: Option<UserId>,
    ) -> Result<Option<u64>, StoreError> {
        let mut tables = self.write("register_exchange")?;
        tables.member(user)?;
        let version = tables.spare_version(user, given)?;
        tables.take_duplicate(user, given, version)?;
        tables.receive(user, received);
        let request = counterparty.map(|receiver| {
            tables.file_request(user, receiver, Some(given), received, TradeKind::Exchange)
        });
        info!("User {user} exchanged #{given} for #{received}");
        Ok(request)
    }

    /// The user bought `received`.
    ///
    /// # Returns
    ///
    /// Id of the request filed to `seller`, if one was given
    ///
    /// # Errors
    ///
    /// * If the user is not registered
    pub fn register_purchase(
        &self,
        user: UserId,
        received: ItemNumber,
        seller: Option<UserId>,
    ) -> Result<Option<u64>, StoreError> {
        let mut tables = self.write("register_purchase")?;
        tables.member(user)?;
        tables.receive(user, received);
        let request = seller.map(|receiver| {
            tables.file_request(user, receiver, None, received, TradeKind::Purchase)
        });
        info!("User {user} bought #{received}");
        Ok(request)
    }

    /// The seller handed over one spare copy of `item`.
    ///
    /// # Returns
    ///
    /// Spare copies left
    ///
    /// # Errors
    ///
    /// * If the seller has no spare copy of `item`
    pub fn record_sale(&self, seller: UserId, item: ItemNumber) -> Result<u32, StoreError> {
        let mut tables = self.write("record_sale")?;
        let version = tables.spare_version(seller, item)?;
        tables.take_duplicate(seller, item, version)
    }

    /// Requests waiting for the user to confirm.
    ///
    /// # Errors
    ///
    /// * If the store lock is poisoned
    pub fn pending_requests(&self, user: UserId) -> Result<Vec<TradeRequest>, StoreError> {
        Ok(self
            .read("pending_requests")?
            .requests
            .values()
            .filter(|r| r.receiver == user && r.status == RequestStatus::Pending)
            .cloned()
            .collect())
    }

    /// The receiver confirms their side of a request: their spare copy goes
    /// and, for exchanges, they gain the item the sender handed over.
    ///
    /// # Errors
    ///
    /// * If the request does not exist
    /// * If it is not pending for `receiver`
    /// * If the receiver no longer has the spare copy. The request stays pending.
    pub fn confirm_request(&self, id: u64, receiver: UserId) -> Result<(), StoreError> {
        let mut tables = self.write("confirm_request")?;
        let request = tables
            .requests
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("trade request {id}")))?;
        if request.receiver != receiver || request.status != RequestStatus::Pending {
            return Err(StoreError::Rejected(format!(
                "request {id} is not pending for user {receiver}"
            )));
        }

        let version = tables.spare_version(receiver, request.received)?;
        tables.take_duplicate(receiver, request.received, version)?;
        if let (TradeKind::Exchange, Some(sent)) = (request.kind, request.sent) {
            tables.receive(receiver, sent);
        }
        if let Some(stored) = tables.requests.get_mut(&id) {
            stored.status = RequestStatus::Accepted;
        }
        info!("User {receiver} confirmed trade request {id}");
        Ok(())
    }

    /// Drops a pending request without touching either inventory.
    ///
    /// # Errors
    ///
    /// * If the request is not pending for `receiver`
    pub fn reject_request(&self, id: u64, receiver: UserId) -> Result<(), StoreError> {
        let mut tables = self.write("reject_request")?;
        let pending = tables
            .requests
            .get(&id)
            .is_some_and(|r| r.receiver == receiver && r.status == RequestStatus::Pending);
        if !pending {
            return Err(StoreError::NotFound(format!(
                "pending trade request {id} for user {receiver}"
            )));
        }
        tables.requests.remove(&id);
        Ok(())
    }

    /// Applies all three legs of a bridge chain at once.
    ///
    /// Every giver's spare copy is checked before anything changes, so either
    /// all legs happen or none does.
    ///
    /// # Errors
    ///
    /// * If any party no longer has the spare copy it has to give
    pub fn confirm_bridge(&self, chain: &BridgeChain) -> Result<(), StoreError> {
        let mut tables = self.write("confirm_bridge")?;
        let legs = chain.legs();
        let versions = legs
            .iter()
            .map(|leg| tables.spare_version(leg.from, leg.item))
            .collect::<Result<Vec<_>, _>>()?;

        for (leg, version) in legs.iter().zip(versions) {
            tables.take_duplicate(leg.from, leg.item, version)?;
            tables.receive(leg.to, leg.item);
        }
        info!("Confirmed {chain}");
        Ok(())
    }

    /// Records a recommendation from `voter` and bumps the target's reputation.
    ///
    /// # Returns
    ///
    /// The target's new reputation
    ///
    /// # Errors
    ///
    /// * If `voter` and `target` are the same user
    /// * If `voter` already recommended `target`
    /// * If either user is not registered
    pub fn vote(&self, voter: UserId, target: UserId) -> Result<i64, StoreError> {
        if voter == target {
            return Err(StoreError::Rejected(
                "users cannot recommend themselves".to_string(),
            ));
        }
        let mut tables = self.write("vote")?;
        tables.member(voter)?;
        tables.member(target)?;
        if !tables.votes.insert((voter, target)) {
            return Err(StoreError::Rejected(format!(
                "user {voter} already recommended user {target}"
            )));
        }
        let profile = tables
            .members
            .get_mut(&target)
            .ok_or_else(|| StoreError::NotFound(format!("user {target}")))?;
        profile.reputation += 1;
        Ok(profile.reputation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Holding, Member};
    use crate::store::InventoryStore;
    use crate::trade::matcher::Matcher;
    use crate::trade::test_helpers::*;
    use std::collections::BTreeSet;

    fn pair() -> (Member, Member, InMemoryStore) {
        let me = member(1, "Yo", "Mendoza", "Centro", 0);
        let u = member(2, "Dibu", "Mendoza", "Centro", 0);
        let store = store(
            &[&me, &u],
            &[
                Holding::wishlist(me.id, 3),
                Holding::duplicate(me.id, 4, 0, 1),
                Holding::duplicate(u.id, 3, 0, 2),
                Holding::duplicate(u.id, 5, 200, 1),
            ],
        );
        (me, u, store)
    }

    #[test]
    fn test_exchange_round_trip() {
        let (me, u, store) = pair();
        let market = store.get_market_snapshot(me.id).unwrap();
        let matches = Matcher::new(&store).find_matches(me.id, &market);
        let swap = &matches.direct_trades[0];

        let request = store.confirm_trade(me.id, swap).unwrap();

        let mine = store.get_my_inventory(me.id).unwrap();
        assert!(mine.owns(3));
        assert!(!mine.wants(3));
        assert!(mine.listing(4).is_none());

        let pending = store.pending_requests(u.id).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, request);
        assert_eq!(pending[0].sent, Some(4));
        assert_eq!(pending[0].received, 3);

        store.confirm_request(request, u.id).unwrap();

        let theirs = store.get_my_inventory(u.id).unwrap();
        assert_eq!(theirs.listing(3).map(|l| l.quantity), Some(1));
        assert!(theirs.owns(4));
        assert!(store.pending_requests(u.id).unwrap().is_empty());
        assert!(matches!(
            store.confirm_request(request, u.id),
            Err(StoreError::Rejected(_))
        ));
    }

    #[test]
    fn test_purchase_and_sale() {
        let (me, u, store) = pair();
        let market = store.get_market_snapshot(me.id).unwrap();
        let matches = Matcher::new(&store).find_matches(me.id, &market);
        let sale = &matches.cash_sales[0];

        let request = store.confirm_trade(me.id, sale).unwrap();
        assert!(store.get_my_inventory(me.id).unwrap().owns(5));

        store.confirm_request(request, u.id).unwrap();
        assert!(store.get_my_inventory(u.id).unwrap().listing(5).is_none());
    }

    #[test]
    fn test_last_copy_cannot_be_sold_twice() {
        let (me, u, store) = pair();
        let other = member(3, "Otro", "Mendoza", "Centro", 0);
        store.register_member(other.clone()).unwrap();

        let first = store.register_purchase(me.id, 5, Some(u.id)).unwrap().unwrap();
        let second = store.register_purchase(other.id, 5, Some(u.id)).unwrap().unwrap();

        store.confirm_request(first, u.id).unwrap();
        assert_eq!(
            store.confirm_request(second, u.id).unwrap_err().to_string(),
            "rejected: user 2 has no spare #5"
        );
        assert_eq!(store.pending_requests(u.id).unwrap().len(), 1);
        store.reject_request(second, u.id).unwrap();
        assert!(store.pending_requests(u.id).unwrap().is_empty());
    }

    #[test]
    fn test_exchange_without_spare_copy() {
        let (me, _, store) = pair();
        assert!(matches!(
            store.register_exchange(me.id, 99, 3, None),
            Err(StoreError::Rejected(_))
        ));
        assert_eq!(store.record_sale(me.id, 4), Ok(0));
        assert!(store.record_sale(me.id, 4).is_err());
    }

    #[test]
    fn test_confirm_bridge_moves_all_items() {
        let me = member(1, "Yo", "Mendoza", "Centro", 0);
        let target = member(2, "Target", "Mendoza", "Centro", 0);
        let bridge = member(3, "Puente", "Mendoza", "Centro", 0);
        let store = store(
            &[&me, &target, &bridge],
            &[
                Holding::wishlist(me.id, 10),
                Holding::duplicate(me.id, 20, 0, 1),
                Holding::duplicate(target.id, 10, 0, 1),
                Holding::wishlist(target.id, 30),
                Holding::duplicate(bridge.id, 30, 0, 1),
                Holding::wishlist(bridge.id, 20),
            ],
        );
        let chain = BridgeChain::new(me.id, bridge.clone(), target.clone(), 20, 30, 10).unwrap();

        store.confirm_bridge(&chain).unwrap();

        let mine = store.get_my_inventory(me.id).unwrap();
        assert!(mine.owns(10) && !mine.wants(10) && mine.duplicates.is_empty());
        let theirs = store.get_my_inventory(target.id).unwrap();
        assert!(theirs.owns(30) && theirs.wishlist.is_empty());
        let bridged = store.get_my_inventory(bridge.id).unwrap();
        assert_eq!(bridged.owned, BTreeSet::from([20]));

        // Nothing left to give: a second confirmation changes nothing.
        assert!(store.confirm_bridge(&chain).is_err());
        assert!(store.get_my_inventory(bridge.id).unwrap().owns(20));
    }

    #[test]
    fn test_vote() {
        let (me, u, store) = pair();
        assert_eq!(store.vote(me.id, u.id), Ok(1));
        assert!(matches!(store.vote(me.id, u.id), Err(StoreError::Rejected(_))));
        assert!(matches!(store.vote(me.id, me.id), Err(StoreError::Rejected(_))));
        assert!(matches!(
            store.vote(me.id, UserId(42)),
            Err(StoreError::NotFound(_))
        ));
        assert_eq!(store.member(u.id).unwrap().profile.reputation, 1);
    }
}
