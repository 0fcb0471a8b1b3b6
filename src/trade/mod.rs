//! # Trade Module
//!
//! This module contains the matching and triangulation engine.
//! It finds direct swaps and cash sales between the caller and every other
//! user, and three-party bridge chains for items no direct swap can deliver.

/// Three-party exchange chains
pub mod bridge;
/// Market view filters and pagination
pub mod filter;
/// Per-user inventory snapshot
pub mod inventory;
/// Market snapshot of other users' holdings
pub mod market;
/// Direct trade and cash sale matching
pub mod matcher;
/// Test helpers and utilities
#[cfg(test)]
pub(crate) mod test_helpers;
/// Bridge chain search
pub mod triangulator;
/// Common type definitions
pub mod types;
