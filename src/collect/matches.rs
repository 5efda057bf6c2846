//! Match collection.
//!
//! For every player, list recent ranked solo match ids, resolve each id to a
//! full record and fold it into a [`MatchSet`] keyed by numeric game id.
//! Team-mates share games, so the same game arrives many times; it is stored
//! once.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::CollectError;
use crate::models::Match;
use crate::riot::{MatchIdQuery, Region, RiotClient};
use crate::storage::{RecordKind, RecordStore};

/// Where match ids and records come from.
#[async_trait]
pub trait MatchSource: Send + Sync {
    /// Most recent ranked solo match ids for a player. Unknown players have
    /// none.
    async fn recent_match_ids(&self, puuid: &str, count: u32) -> Result<Vec<String>, CollectError>;

    /// Resolve a match id. `None` when Riot does not know it.
    async fn match_by_id(&self, match_id: &str) -> Result<Option<Match>, CollectError>;
}

/// Reads matches from the record cache, fetching through the Riot client on
/// a miss. A cached match is used only if the game completed; otherwise it
/// is fetched again and the cache updated.
pub struct CachedMatchSource {
    client: RiotClient,
    store: RecordStore,
    region: Region,
}

impl CachedMatchSource {
    pub fn new(client: RiotClient, store: RecordStore, region: Region) -> Self {
        Self {
            client,
            store,
            region,
        }
    }
}

#[async_trait]
impl MatchSource for CachedMatchSource {
    async fn recent_match_ids(&self, puuid: &str, count: u32) -> Result<Vec<String>, CollectError> {
        let ids = self
            .client
            .match_ids_by_puuid(puuid, self.region, &MatchIdQuery::ranked_solo(count))
            .await?;
        Ok(ids.unwrap_or_default())
    }

    async fn match_by_id(&self, match_id: &str) -> Result<Option<Match>, CollectError> {
        if let Some(cached) = self.store.get::<Match>(RecordKind::Match, match_id).await? {
            if cached.value.is_complete() {
                debug!(match_id, "Match served from cache");
                return Ok(Some(cached.value));
            }
            debug!(match_id, "Cached match incomplete, refetching");
        }

        let Some(fetched) = self.client.match_by_id(match_id, self.region).await? else {
            return Ok(None);
        };
        self.store
            .upsert(RecordKind::Match, match_id, &fetched)
            .await?;
        Ok(Some(fetched))
    }
}

/// Deduplicated matches keyed by game id.
#[derive(Debug, Clone, Default)]
pub struct MatchSet {
    matches: BTreeMap<i64, Match>,
}

impl MatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a match. Returns `false` if its game id was already present, in
    /// which case the set is unchanged.
    pub fn insert(&mut self, m: Match) -> bool {
        let game_id = m.game_id();
        if self.matches.contains_key(&game_id) {
            return false;
        }
        self.matches.insert(game_id, m);
        true
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn contains(&self, game_id: i64) -> bool {
        self.matches.contains_key(&game_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Match> {
        self.matches.values()
    }
}

impl FromIterator<Match> for MatchSet {
    fn from_iter<I: IntoIterator<Item = Match>>(iter: I) -> Self {
        let mut set = MatchSet::new();
        for m in iter {
            set.insert(m);
        }
        set
    }
}

/// A player's most recent ranked solo games, newest first. Ids the source
/// cannot resolve are skipped.
pub async fn match_history(
    source: &dyn MatchSource,
    puuid: &str,
    count: u32,
) -> Result<Vec<Match>, CollectError> {
    let ids = source.recent_match_ids(puuid, count).await?;
    let mut history = Vec::with_capacity(ids.len());
    for match_id in ids {
        match source.match_by_id(&match_id).await? {
            Some(m) => history.push(m),
            None => debug!(puuid, match_id = %match_id, "Listed match not found"),
        }
    }
    Ok(history)
}

/// Builds a [`MatchSet`] for a population of players.
pub struct MatchCollector {
    source: Arc<dyn MatchSource>,
    matches_per_player: u32,
}

impl MatchCollector {
    pub fn new(source: Arc<dyn MatchSource>, matches_per_player: u32) -> Self {
        Self {
            source,
            matches_per_player,
        }
    }

    /// Collect the recent games of every player. Any error aborts the run.
    pub async fn collect<'a, I>(&self, puuids: I) -> Result<MatchSet, CollectError>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut set = MatchSet::new();
        let mut seen_ids: HashSet<String> = HashSet::new();
        let mut players = 0usize;

        for puuid in puuids {
            players += 1;
            let ids = self
                .source
                .recent_match_ids(puuid, self.matches_per_player)
                .await?;
            debug!(puuid = %puuid, matches = ids.len(), "Match ids listed");

            for match_id in ids {
                if !seen_ids.insert(match_id.clone()) {
                    continue;
                }
                if let Some(m) = self.source.match_by_id(&match_id).await? {
                    set.insert(m);
                }
            }

            if players % 50 == 0 {
                info!(players, matches = set.len(), "Collection progress");
            }
        }

        info!(players, matches = set.len(), "Collection complete");
        Ok(set)
    }
}
