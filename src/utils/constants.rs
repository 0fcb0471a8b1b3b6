/// Most bridge chains returned per search
pub const MAX_BRIDGE_CHAINS: usize = 5;

/// Matches shown per market page
pub const DEFAULT_PAGE_SIZE: usize = 15;

/// Seconds a cached market snapshot stays valid
pub const DEFAULT_MARKET_TTL_SECS: u64 = 60;

/// Contacts a non-premium user can unlock per day
pub const DEFAULT_DAILY_FREE_CONTACTS: u32 = 1;

/// Album sections: name and inclusive item range
pub const ALBUM_SECTIONS: [(&str, u32, u32); 11] = [
    ("ARG - Argentina", 1, 19),
    ("BRA - Brasil", 20, 38),
    ("FRA - Francia", 39, 57),
    ("GER - Alemania", 58, 76),
    ("ESP - España", 77, 95),
    ("ENG - Inglaterra", 96, 114),
    ("ITA - Italia", 115, 133),
    ("USA - Estados Unidos", 134, 152),
    ("MEX - México", 153, 171),
    ("CAN - Canadá", 172, 190),
    ("FWC - Museos / Especiales", 191, 200),
];

/// Log level used when `RUST_LOG` names none
pub const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
