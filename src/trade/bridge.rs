//! A bridge chain is a three-party cyclic exchange: Me -> Bridge -> Target-holder -> Me.
//! Each party gives one item and receives one item it wants, so nobody gives for nothing.

use std::fmt::{self, Display};

use eyre::{bail, Result};
use serde::Serialize;

use super::types::{ItemNumber, UserId};
use crate::models::Member;

/// One hand-over inside a chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Leg {
    /// Giver
    pub from: UserId,
    /// Receiver
    pub to: UserId,
    /// Item handed over
    pub item: ItemNumber,
}

impl Display for Leg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -#{}-> {}", self.from, self.item, self.to)
    }
}

/// A validated three-party exchange proposal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BridgeChain {
    /// The user the chain was computed for
    pub me: UserId,
    /// Intermediary who takes one of my duplicates and forwards one of theirs
    pub bridge: Member,
    /// Holder of the item I want
    pub target: Member,
    /// Me -> bridge: one of my duplicates on the bridge's wishlist
    pub bridge_wants: ItemNumber,
    /// Bridge -> target: a bridge duplicate on the target's wishlist
    pub bridge_gives: ItemNumber,
    /// Target -> me: the item I asked for
    pub target_gives: ItemNumber,
}

impl Display for BridgeChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Chain(me -#{}-> {} -#{}-> {} -#{}-> me)",
            self.bridge_wants, self.bridge, self.bridge_gives, self.target, self.target_gives
        )
    }
}

impl BridgeChain {
    /// Creates a chain between three distinct parties where nobody gets back
    /// the item they hand over.
    ///
    /// # Errors
    ///
    /// * If two of the parties are the same user
    /// * If any party would receive the same item it gives away
    pub fn new(
        me: UserId,
        bridge: Member,
        target: Member,
        bridge_wants: ItemNumber,
        bridge_gives: ItemNumber,
        target_gives: ItemNumber,
    ) -> Result<Self> {
        let chain = Self {
            me,
            bridge,
            target,
            bridge_wants,
            bridge_gives,
            target_gives,
        };
        chain.validate()?;
        Ok(chain)
    }

    /// The three hand-overs in order: me to bridge, bridge to target, target to me
    #[must_use]
    pub const fn legs(&self) -> [Leg; 3] {
        [
            Leg {
                from: self.me,
                to: self.bridge.id,
                item: self.bridge_wants,
            },
            Leg {
                from: self.bridge.id,
                to: self.target.id,
                item: self.bridge_gives,
            },
            Leg {
                from: self.target.id,
                to: self.me,
                item: self.target_gives,
            },
        ]
    }

    /// Users taking part, in leg order
    #[must_use]
    pub const fn parties(&self) -> [UserId; 3] {
        [self.me, self.bridge.id, self.target.id]
    }

    fn validate(&self) -> Result<()> {
        if self.me == self.bridge.id || self.me == self.target.id {
            bail!("Chain cannot route through its own caller");
        }
        if self.bridge.id == self.target.id {
            bail!("Bridge and target must be different users");
        }
        if self.bridge_wants == self.bridge_gives {
            bail!("Bridge would receive the item it gives away");
        }
        if self.bridge_gives == self.target_gives {
            bail!("Target would receive the item it gives away");
        }
        if self.target_gives == self.bridge_wants {
            bail!("Caller would give away the item they asked for");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trade::test_helpers::*;

    fn parties() -> (UserId, Member, Member) {
        (
            UserId(1),
            member(2, "Puente", "Mendoza", "Centro", 0),
            member(3, "Target", "Mendoza", "Centro", 0),
        )
    }

    #[test]
    fn test_legs_close_the_cycle() {
        let (me, bridge, target) = parties();
        let chain = BridgeChain::new(me, bridge, target, 20, 30, 10).unwrap();

        let legs = chain.legs();
        assert_eq!(
            legs,
            [
                Leg {
                    from: UserId(1),
                    to: UserId(2),
                    item: 20,
                },
                Leg {
                    from: UserId(2),
                    to: UserId(3),
                    item: 30,
                },
                Leg {
                    from: UserId(3),
                    to: UserId(1),
                    item: 10,
                },
            ]
        );
        assert_eq!(chain.parties(), [UserId(1), UserId(2), UserId(3)]);
        assert_eq!(legs[0].to_string(), "1 -#20-> 2");
        assert_eq!(
            chain.to_string(),
            "Chain(me -#20-> Puente(2) -#30-> Target(3) -#10-> me)"
        );
    }

    #[test]
    fn test_new_rejects_caller_as_party() {
        let (me, _, target) = parties();
        let caller = member(1, "Yo", "Mendoza", "Centro", 0);
        let chain = BridgeChain::new(me, caller, target, 20, 30, 10);
        assert_eq!(
            chain.err().unwrap().to_string(),
            "Chain cannot route through its own caller"
        );
    }

    #[test]
    fn test_new_rejects_bridge_as_target() {
        let (me, bridge, _) = parties();
        let chain = BridgeChain::new(me, bridge.clone(), bridge, 20, 30, 10);
        assert_eq!(
            chain.err().unwrap().to_string(),
            "Bridge and target must be different users"
        );
    }

    #[test]
    fn test_new_rejects_bridge_round_trip() {
        let (me, bridge, target) = parties();
        let chain = BridgeChain::new(me, bridge, target, 20, 20, 10);
        assert_eq!(
            chain.err().unwrap().to_string(),
            "Bridge would receive the item it gives away"
        );
    }

    #[test]
    fn test_new_rejects_item_returning_to_giver() {
        let (me, bridge, target) = parties();

        let target_round_trip = BridgeChain::new(me, bridge.clone(), target.clone(), 20, 10, 10);
        assert_eq!(
            target_round_trip.err().unwrap().to_string(),
            "Target would receive the item it gives away"
        );

        let caller_round_trip = BridgeChain::new(me, bridge, target, 10, 30, 10);
        assert_eq!(
            caller_round_trip.err().unwrap().to_string(),
            "Caller would give away the item they asked for"
        );
    }
}
