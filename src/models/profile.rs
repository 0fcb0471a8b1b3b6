use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::trade::types::UserId;

/// Where a user meets for trades. Compared by exact province and zone name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locality {
    /// Province name
    pub province: String,
    /// Department or neighbourhood inside the province
    pub zone: String,
}

impl Locality {
    /// Creates a locality from province and zone names
    pub fn new(province: impl Into<String>, zone: impl Into<String>) -> Self {
        Self {
            province: province.into(),
            zone: zone.into(),
        }
    }

    /// Same province and same zone. Surrounding whitespace is ignored, nothing else is.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        same_place(&self.province, &other.province) && same_place(&self.zone, &other.zone)
    }
}

/// Whether two province or zone names denote the same place
#[must_use]
pub fn same_place(a: &str, b: &str) -> bool {
    a.trim() == b.trim()
}

impl Display for Locality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.province, self.zone)
    }
}

/// Public profile fields joined onto market rows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Display name
    pub nick: String,
    /// Meeting locality
    #[serde(flatten)]
    pub locality: Locality,
    /// Contact handle, revealed only once a viewer unlocks it
    #[serde(default)]
    pub contact: String,
    /// Number of recommendations received
    #[serde(default)]
    pub reputation: i64,
}

/// A user together with their profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// User id
    pub id: UserId,
    /// Profile fields
    #[serde(flatten)]
    pub profile: Profile,
}

impl Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.profile.nick, self.id)
    }
}
