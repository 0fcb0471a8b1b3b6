//! Album layout: named sections of consecutive sticker numbers.

use std::fmt;
use std::ops::RangeInclusive;

use serde::Serialize;

use crate::trade::inventory::UserInventory;
use crate::trade::types::ItemNumber;
use crate::utils::constants::ALBUM_SECTIONS;

/// A named page of the album
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Display name, team code first
    pub name: &'static str,
    /// First item number
    pub first: ItemNumber,
    /// Last item number, inclusive
    pub last: ItemNumber,
}

impl Section {
    /// Item numbers in this section
    #[must_use]
    pub const fn range(&self) -> RangeInclusive<ItemNumber> {
        self.first..=self.last
    }

    /// Number of stickers in this section
    #[must_use]
    pub const fn len(&self) -> u32 {
        self.last - self.first + 1
    }

    /// Whether `item` belongs to this section
    #[must_use]
    pub const fn contains(&self, item: ItemNumber) -> bool {
        self.first <= item && item <= self.last
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}-{})", self.name, self.first, self.last)
    }
}

/// Every section, in album order
pub fn sections() -> impl Iterator<Item = Section> {
    let table: &'static [(&'static str, ItemNumber, ItemNumber)] = &ALBUM_SECTIONS;
    table
        .iter()
        .map(|&(name, first, last)| Section { name, first, last })
}

/// Section holding `item`, `None` for numbers outside the album
#[must_use]
pub fn section_of(item: ItemNumber) -> Option<Section> {
    sections().find(|section| section.contains(item))
}

/// Last sticker number of the album
#[must_use]
pub fn album_size() -> u32 {
    sections().map(|section| section.last).max().unwrap_or(0)
}

/// Stickers collected out of a total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// Items the user has
    pub owned: u32,
    /// Items there are
    pub total: u32,
}

impl Progress {
    /// Completion as a percentage, 0 for an empty total
    #[must_use]
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        f64::from(self.owned) * 100.0 / f64::from(self.total)
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({:.0}%)", self.owned, self.total, self.percent())
    }
}

/// How much of `section` the inventory covers
#[must_use]
pub fn progress(inventory: &UserInventory, section: &Section) -> Progress {
    let owned = inventory.owned.range(section.range()).count();
    Progress {
        owned: u32::try_from(owned).unwrap_or(u32::MAX),
        total: section.len(),
    }
}

/// How much of the whole album the inventory covers
#[must_use]
pub fn album_progress(inventory: &UserInventory) -> Progress {
    sections()
        .map(|section| progress(inventory, &section))
        .fold(Progress { owned: 0, total: 0 }, |acc, p| Progress {
            owned: acc.owned + p.owned,
            total: acc.total + p.total,
        })
}
