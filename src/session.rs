//! Per-viewer browsing state: whose contact details are revealed and how
//! many reveals the viewer has left today.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use eyre::{bail, Result};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::trade::types::UserId;

/// Daily contact allowance of one user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactCredits {
    /// Premium users are never limited
    #[serde(default)]
    pub premium: bool,
    /// Day the counter below refers to
    #[serde(default)]
    pub last_contact_date: Option<NaiveDate>,
    /// Contacts unlocked on `last_contact_date`
    #[serde(default)]
    pub used_today: u32,
}

impl ContactCredits {
    /// Contacts still available on `today`, `None` when unlimited
    #[must_use]
    pub fn remaining(&self, today: NaiveDate, daily_free: u32) -> Option<u32> {
        if self.premium {
            return None;
        }
        if self.last_contact_date == Some(today) {
            Some(daily_free.saturating_sub(self.used_today))
        } else {
            Some(daily_free)
        }
    }

    /// Whether one more contact can be unlocked on `today`
    #[must_use]
    pub fn can_contact(&self, today: NaiveDate, daily_free: u32) -> bool {
        self.remaining(today, daily_free) != Some(0)
    }

    /// Spends one contact, starting a new count when the day changed.
    ///
    /// # Errors
    ///
    /// * If the free allowance for `today` is used up
    pub fn consume(&mut self, today: NaiveDate, daily_free: u32) -> Result<()> {
        if !self.can_contact(today, daily_free) {
            bail!("Daily contact limit of {daily_free} reached");
        }
        if self.premium {
            return Ok(());
        }
        if self.last_contact_date != Some(today) {
            self.last_contact_date = Some(today);
            self.used_today = 0;
        }
        self.used_today += 1;
        Ok(())
    }
}

/// What one viewer has unlocked while browsing the market
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// The browsing user
    pub viewer: UserId,
    /// Users whose contact details are revealed
    unlocked: BTreeSet<UserId>,
    /// The viewer dismissed the meeting safety notice for good
    pub skip_safety_notice: bool,
    /// Free contacts per day for non-premium viewers
    daily_free_contacts: u32,
}

impl Session {
    /// Starts a session with nothing unlocked
    #[must_use]
    pub const fn new(viewer: UserId, daily_free_contacts: u32) -> Self {
        Self {
            viewer,
            unlocked: BTreeSet::new(),
            skip_safety_notice: false,
            daily_free_contacts,
        }
    }

    /// Reveals `target`'s contact details, spending a credit the first time.
    ///
    /// # Returns
    ///
    /// `true` if a credit was spent, `false` if `target` was already unlocked
    ///
    /// # Errors
    ///
    /// * If `target` is the viewer
    /// * If the viewer has no contacts left today
    pub fn unlock(
        &mut self,
        target: UserId,
        credits: &mut ContactCredits,
        today: NaiveDate,
    ) -> Result<bool> {
        if target == self.viewer {
            bail!("User {target} cannot unlock their own contact");
        }
        if self.is_unlocked(target) {
            return Ok(false);
        }
        credits.consume(today, self.daily_free_contacts)?;
        self.unlocked.insert(target);
        debug!("User {} unlocked contact of {target}", self.viewer);
        Ok(true)
    }

    /// Whether `target`'s contact details are revealed
    #[must_use]
    pub fn is_unlocked(&self, target: UserId) -> bool {
        self.unlocked.contains(&target)
    }

    /// Hides `target` again, typically once a trade with them is registered
    pub fn relock(&mut self, target: UserId) -> bool {
        self.unlocked.remove(&target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, d).unwrap()
    }

    #[test]
    fn test_one_free_contact_per_day() {
        let mut session = Session::new(UserId(1), 1);
        let mut credits = ContactCredits::default();

        assert!(session.unlock(UserId(2), &mut credits, day(1)).unwrap());
        // Already unlocked users cost nothing.
        assert!(!session.unlock(UserId(2), &mut credits, day(1)).unwrap());
        assert!(session.unlock(UserId(3), &mut credits, day(1)).is_err());
        assert!(!session.is_unlocked(UserId(3)));

        assert!(session.unlock(UserId(3), &mut credits, day(2)).unwrap());
        assert_eq!(credits.last_contact_date, Some(day(2)));
        assert_eq!(credits.used_today, 1);
    }

    #[test]
    fn test_premium_is_unlimited() {
        let mut session = Session::new(UserId(1), 1);
        let mut credits = ContactCredits {
            premium: true,
            ..ContactCredits::default()
        };
        for target in 2..10 {
            assert!(session.unlock(UserId(target), &mut credits, day(1)).unwrap());
        }
        assert_eq!(credits.remaining(day(1), 1), None);
        assert_eq!(credits.used_today, 0);
    }

    #[test]
    fn test_relock_and_self_unlock() {
        let mut session = Session::new(UserId(1), 3);
        let mut credits = ContactCredits::default();
        assert!(session.unlock(UserId(1), &mut credits, day(1)).is_err());

        session.unlock(UserId(2), &mut credits, day(1)).unwrap();
        assert!(session.relock(UserId(2)));
        assert!(!session.is_unlocked(UserId(2)));
        assert!(!session.relock(UserId(2)));
        assert_eq!(credits.remaining(day(1), 3), Some(2));
    }
}
