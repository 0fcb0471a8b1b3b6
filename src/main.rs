use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use eyre::{bail, Result, WrapErr};
use figus::album::{album_progress, progress, sections};
use figus::config::Config;
use figus::store::{CachedStore, InMemoryStore, InventoryStore, StoreSeed};
use figus::trade::filter::{paginate, MarketFilter};
use figus::trade::matcher::Matcher;
use figus::trade::triangulator::Triangulator;
use figus::trade::types::{ItemNumber, UserId};
use figus::utils::constants::DEFAULT_LOG_LEVEL;
use figus::utils::logger::setup_logger;
use log::info;
use serde_json::json;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Store seed file, overrides FIGUS_SEED_PATH
    #[arg(long, global = true)]
    seed: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Direct trades and cash sales for a user, as JSON
    Market {
        #[arg(long)]
        user: u64,
        /// Only users in these provinces
        #[arg(long)]
        province: Vec<String>,
        /// Only users in these zones
        #[arg(long)]
        zone: Vec<String>,
        /// Only this sticker
        #[arg(long)]
        item: Option<ItemNumber>,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Three-party chains delivering an item to a user
    Bridges {
        #[arg(long)]
        user: u64,
        #[arg(long)]
        item: ItemNumber,
    },
    /// Album completion of a user
    Progress {
        #[arg(long)]
        user: u64,
    },
}

fn load_store(path: Option<&Path>) -> Result<InMemoryStore> {
    let Some(path) = path else {
        bail!("No seed file: pass --seed or set FIGUS_SEED_PATH");
    };
    let raw = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read seed {}", path.display()))?;
    let seed: StoreSeed = serde_json::from_str(&raw)
        .wrap_err_with(|| format!("Invalid seed {}", path.display()))?;
    info!(
        "Loaded {} members and {} holdings from {}",
        seed.members.len(),
        seed.holdings.len(),
        path.display()
    );
    Ok(InMemoryStore::from_seed(seed)?)
}

fn show_market(
    store: &CachedStore<InMemoryStore>,
    config: &Config,
    user: UserId,
    filter: &MarketFilter,
    page: usize,
) -> Result<()> {
    let market = store.get_market_snapshot(user)?;
    let matches = Matcher::new(store).try_find_matches(user, &market)?;

    let direct_trades = filter.apply(&matches.direct_trades);
    let cash_sales = filter.apply(&matches.cash_sales);
    let output = json!({
        "direct_trades": paginate(&direct_trades, page, config.page_size),
        "cash_sales": paginate(&cash_sales, page, config.page_size),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn show_bridges(
    store: &CachedStore<InMemoryStore>,
    config: &Config,
    user: UserId,
    item: ItemNumber,
) -> Result<()> {
    let me = store.inner().member(user)?;
    let inventory = store.get_my_inventory(user)?;
    if inventory.owns(item) {
        bail!("User {user} already has #{item}");
    }

    let chains = Triangulator::new(store)
        .with_limit(config.bridge_limit)
        .try_find_bridges(&me, item, &inventory.duplicate_items())?;
    if chains.is_empty() {
        println!("No bridge chains deliver #{item} to {me}");
    }
    for chain in &chains {
        println!("{chain}");
        for leg in chain.legs() {
            println!("  {leg}");
        }
    }
    Ok(())
}

fn show_progress(store: &CachedStore<InMemoryStore>, user: UserId) -> Result<()> {
    let inventory = store.get_my_inventory(user)?;
    for section in sections() {
        println!("{section}: {}", progress(&inventory, &section));
    }
    println!("Total: {}", album_progress(&inventory));
    Ok(())
}

fn main() -> Result<()> {
    setup_logger(DEFAULT_LOG_LEVEL)?;

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if cli.seed.is_some() {
        config.seed_path = cli.seed;
    }
    let store = CachedStore::new(load_store(config.seed_path.as_deref())?, config.market_ttl);

    match cli.command {
        Commands::Market {
            user,
            province,
            zone,
            item,
            page,
        } => {
            let filter = MarketFilter {
                provinces: province,
                zones: zone,
                item,
            };
            show_market(&store, &config, UserId(user), &filter, page)?;
        }
        Commands::Bridges { user, item } => show_bridges(&store, &config, UserId(user), item)?,
        Commands::Progress { user } => show_progress(&store, UserId(user))?,
    }

    Ok(())
}
