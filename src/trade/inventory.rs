use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::types::ItemNumber;
use crate::models::{Holding, Listing, Status};

/// One user's holdings partitioned by status.
///
/// Duplicates imply ownership, so every duplicate item is also in `owned`.
/// Ordered collections keep every derived choice independent of row order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInventory {
    /// Items the user has, including those held as duplicates
    pub owned: BTreeSet<ItemNumber>,
    /// Items with spare copies and the terms they are offered under
    pub duplicates: BTreeMap<ItemNumber, Listing>,
    /// Items the user wants
    pub wishlist: BTreeSet<ItemNumber>,
}

impl UserInventory {
    /// Partitions holding records by status.
    ///
    /// # Arguments
    ///
    /// * `holdings` - Rows of a single user
    ///
    /// # Returns
    ///
    /// The derived owned, duplicate and wishlist sets
    pub fn from_holdings<'a>(holdings: impl IntoIterator<Item = &'a Holding>) -> Self {
        let mut inventory = Self::default();
        for holding in holdings {
            match holding.status {
                Status::Owned => {
                    inventory.owned.insert(holding.item);
                }
                Status::Duplicate => {
                    inventory.owned.insert(holding.item);
                    inventory.duplicates.insert(holding.item, holding.listing());
                }
                Status::Wishlist => {
                    inventory.wishlist.insert(holding.item);
                }
            }
        }
        inventory
    }

    /// Whether the user already has the item
    #[must_use]
    pub fn owns(&self, item: ItemNumber) -> bool {
        self.owned.contains(&item)
    }

    /// Whether the item is on the user's wishlist
    #[must_use]
    pub fn wants(&self, item: ItemNumber) -> bool {
        self.wishlist.contains(&item)
    }

    /// The listing for a duplicate item, if the user has spare copies
    #[must_use]
    pub fn listing(&self, item: ItemNumber) -> Option<&Listing> {
        self.duplicates.get(&item)
    }

    /// Items the user has spare copies of, ascending
    #[must_use]
    pub fn duplicate_items(&self) -> BTreeSet<ItemNumber> {
        self.duplicates.keys().copied().collect()
    }

    /// No holdings at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.owned.is_empty() && self.wishlist.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trade::types::UserId;

    #[test]
    fn test_from_holdings_partitions_by_status() {
        let me = UserId(1);
        let rows = [
            Holding::owned(me, 1),
            Holding::owned(me, 2),
            Holding::duplicate(me, 4, 0, 2),
            Holding::duplicate(me, 5, 300, 1),
            Holding::wishlist(me, 3),
        ];
        let inventory = UserInventory::from_holdings(&rows);

        assert_eq!(inventory.owned, BTreeSet::from([1, 2, 4, 5]));
        assert_eq!(inventory.duplicate_items(), BTreeSet::from([4, 5]));
        assert_eq!(inventory.wishlist, BTreeSet::from([3]));
        assert_eq!(inventory.listing(4), Some(&Listing::trade(2)));
        assert!(inventory.listing(5).is_some_and(Listing::is_for_sale));
        assert!(inventory.owns(4));
        assert!(!inventory.owns(3));
        assert!(inventory.wants(3));
    }

    #[test]
    fn test_owned_and_duplicate_rows_for_same_item() {
        let me = UserId(1);
        let rows = [Holding::owned(me, 9), Holding::duplicate(me, 9, 0, 3)];
        let inventory = UserInventory::from_holdings(&rows);

        assert_eq!(inventory.owned, BTreeSet::from([9]));
        assert_eq!(inventory.listing(9), Some(&Listing::trade(3)));
    }

    #[test]
    fn test_empty() {
        assert!(UserInventory::from_holdings(&Vec::<Holding>::new()).is_empty());
    }
}
