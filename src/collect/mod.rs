//! Data collection over the Riot client and the record cache.
//!
//! - **discovery**: apex-league player population
//! - **matches**: deduplicated match set for a population, player history
//! - **players**: cached player profile lookup, challenger leaderboard

pub mod discovery;
pub mod matches;
pub mod players;

pub use discovery::LeagueDiscovery;
pub use matches::{match_history, CachedMatchSource, MatchCollector, MatchSet, MatchSource};
pub use players::{LeaderboardEntry, PlayerLookup, PlayerProfile, LEADERBOARD_SIZE};

use thiserror::Error;

use crate::riot::RiotError;
use crate::storage::StorageError;

/// Errors that can occur while collecting data.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("Riot API error: {0}")]
    Riot(#[from] RiotError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
