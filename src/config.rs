//! Runtime configuration read from the environment.
//!
//! A `.env` file in the working directory is loaded first when present.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use eyre::{eyre, Result};

use crate::utils::constants::{
    DEFAULT_DAILY_FREE_CONTACTS, DEFAULT_MARKET_TTL_SECS, DEFAULT_PAGE_SIZE, MAX_BRIDGE_CHAINS,
};

/// Tunables of the marketplace core
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// How long a cached market snapshot is served
    pub market_ttl: Duration,
    /// Most bridge chains returned per search
    pub bridge_limit: usize,
    /// Matches per market page
    pub page_size: usize,
    /// Contacts a non-premium user can unlock per day
    pub daily_free_contacts: u32,
    /// JSON file the CLI seeds its store from
    pub seed_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            market_ttl: Duration::from_secs(DEFAULT_MARKET_TTL_SECS),
            bridge_limit: MAX_BRIDGE_CHAINS,
            page_size: DEFAULT_PAGE_SIZE,
            daily_free_contacts: DEFAULT_DAILY_FREE_CONTACTS,
            seed_path: None,
        }
    }
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// # Environment Variables
    /// * `FIGUS_MARKET_TTL_SECS` - Market cache lifetime, default 60
    /// * `FIGUS_BRIDGE_LIMIT` - Bridge chains per search, 1 to 5, default 5
    /// * `FIGUS_PAGE_SIZE` - Matches per page, default 15
    /// * `FIGUS_DAILY_FREE_CONTACTS` - Free unlocks per day, default 1
    /// * `FIGUS_SEED_PATH` - Store seed file, optional
    ///
    /// # Errors
    /// * If a variable is set to a value that does not parse or is out of range
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    ///
    /// # Errors
    /// * If a value does not parse or is out of range
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            market_ttl: parse(&lookup, "FIGUS_MARKET_TTL_SECS")?
                .map_or(defaults.market_ttl, Duration::from_secs),
            bridge_limit: parse(&lookup, "FIGUS_BRIDGE_LIMIT")?.unwrap_or(defaults.bridge_limit),
            page_size: parse(&lookup, "FIGUS_PAGE_SIZE")?.unwrap_or(defaults.page_size),
            daily_free_contacts: parse(&lookup, "FIGUS_DAILY_FREE_CONTACTS")?
                .unwrap_or(defaults.daily_free_contacts),
            seed_path: lookup("FIGUS_SEED_PATH")
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
        };

        if !(1..=MAX_BRIDGE_CHAINS).contains(&config.bridge_limit) {
            return Err(eyre!(
                "FIGUS_BRIDGE_LIMIT must be between 1 and {MAX_BRIDGE_CHAINS}, got {}",
                config.bridge_limit
            ));
        }
        if config.page_size == 0 {
            return Err(eyre!("FIGUS_PAGE_SIZE must be at least 1"));
        }
        Ok(config)
    }
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| eyre!("{key} has invalid value {raw:?}: {e}"))
        })
        .transpose()
}
