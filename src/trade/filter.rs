use serde::Serialize;

use super::matcher::Match;
use crate::models::profile::same_place;
use super::types::ItemNumber;

/// Narrows the market view. Empty lists and `None` accept everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketFilter {
    /// Accepted provinces
    pub provinces: Vec<String>,
    /// Accepted zones
    pub zones: Vec<String>,
    /// Only this sticker number
    pub item: Option<ItemNumber>,
}

impl MarketFilter {
    /// Whether a match passes every configured criterion
    #[must_use]
    pub fn accepts(&self, candidate: &Match) -> bool {
        let locality = &candidate.profile.locality;
        let listed = |names: &[String], name: &str| {
            names.is_empty() || names.iter().any(|n| same_place(n, name))
        };
        listed(&self.provinces, &locality.province)
            && listed(&self.zones, &locality.zone)
            && self.item.map_or(true, |item| item == candidate.item)
    }

    /// Keeps the accepted matches, preserving their ranking
    #[must_use]
    pub fn apply<'a>(&self, matches: &'a [Match]) -> Vec<&'a Match> {
        matches.iter().filter(|m| self.accepts(m)).collect()
    }
}

/// One page of a ranked list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<'a, T> {
    /// Entries on this page
    pub items: &'a [T],
    /// 1-based page number actually shown
    pub number: usize,
    /// Number of pages, zero for an empty list
    pub total_pages: usize,
}

/// Slices `items` into pages of `page_size`.
///
/// Pages are 1-based; a page number outside the list falls back to the first page.
#[must_use]
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> Page<'_, T> {
    let page_size = page_size.max(1);
    let total_pages = items.len().div_ceil(page_size);
    let number = if page == 0 || page > total_pages { 1 } else { page };
    let start = ((number - 1) * page_size).min(items.len());
    let end = (start + page_size).min(items.len());
    Page {
        items: &items[start..end],
        number,
        total_pages,
    }
}
