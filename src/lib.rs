//! # Rift Meta
//!
//! Apex-league match analysis for League of Legends, built on a rate-limited
//! Riot API gateway.
//!
//! ## Architecture
//!
//! - **riot**: routing values, quota-aware gateway, validation, typed client
//! - **models**: validated Riot DTOs and derived statistics
//! - **collect**: league discovery, match collection, player lookup,
//!   leaderboard and match history
//! - **calculate**: tier-list and per-champion aggregation
//! - **storage**: record cache and the analysis artifact
//! - **pipeline**: one-shot and periodic analysis runs
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

#![recursion_limit = "256"]

pub mod api;
pub mod calculate;
pub mod collect;
pub mod config;
pub mod models;
pub mod pipeline;
pub mod riot;
pub mod storage;

use std::time::Duration;

/// Parse a human-friendly duration string (e.g., "6h", "30m", "90s").
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('h') {
        (n, 3600)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else {
        // Default to seconds
        (s, 1)
    };

    let num: u64 = num_str.parse().ok()?;
    Some(Duration::from_secs(num * multiplier))
}

/// Parse a period for repeated runs. Zero is rejected along with anything
/// [`parse_duration`] rejects.
pub fn parse_interval(s: &str) -> Option<Duration> {
    parse_duration(s).filter(|d| !d.is_zero())
}
