use derive_more::Display;

use crate::trade::types::{ItemNumber, UserId};

/// Failures at the inventory store boundary
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum StoreError {
    /// The backing service could not be reached
    #[display("store unavailable: {_0}")]
    Unavailable(String),
    /// A referenced user, row or request does not exist
    #[display("{_0} not found")]
    NotFound(String),
    /// A versioned write lost a race with another writer
    #[display(
        "concurrent update of #{item} for user {user} (expected version {expected}, found {found})"
    )]
    Conflict {
        /// Owner of the contested row
        user: UserId,
        /// Item of the contested row
        item: ItemNumber,
        /// Version the writer read
        expected: u64,
        /// Version currently stored
        found: u64,
    },
    /// The write breaks a marketplace rule
    #[display("rejected: {_0}")]
    Rejected(String),
    /// A lock guarding the tables was poisoned
    #[display("store lock poisoned during {_0}")]
    LockPoisoned(&'static str),
}

impl std::error::Error for StoreError {}
