/*!
 * # Figus - Sticker Trading Marketplace Core
 *
 * Figus matches collectors who trade album stickers. For one caller it finds
 * the other users they can swap with or buy from, and three-party bridge
 * chains when nobody can swap directly.
 *
 * ## Core Features
 *
 * - **Matching**: Direct swaps and cash sales, ranked wishlist first
 * - **Triangulation**: Chains `me -> bridge -> holder -> me` within one locality
 * - **Ledger**: Trade registration, confirmation and recommendations
 * - **Sessions**: Contact unlocking under a daily allowance
 *
 * ## Module Structure
 *
 * - `album`: Album sections and completion progress
 * - `config`: Configuration from the environment
 * - `models`: Inventory rows and user profiles
 * - `session`: Per-viewer contact unlocking
 * - `store`: Inventory store trait, in-memory store and cache
 * - `trade`: Matching and triangulation engine
 * - `utils`: Constants and logging
 */

/// Album sections and completion progress
pub mod album;
/// Configuration from the environment
pub mod config;
/// Inventory rows and user profiles
pub mod models;
/// Per-viewer contact unlocking
pub mod session;
/// Inventory store trait and implementations
pub mod store;
/// Matching and triangulation engine
pub mod trade;
/// Utility functions and helpers
pub mod utils;
