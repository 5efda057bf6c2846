//! Player profile lookup with cached records.
//!
//! Each record kind has its own lifetime: accounts, summoners and masteries
//! change rarely, the ranked entry changes every game. The challenger
//! leaderboard resolves names through the same cache.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::CollectError;
use crate::calculate::percentage;
use crate::models::{Account, ChampionMastery, LeagueEntry, LeagueItem, Summoner};
use crate::riot::{ApexTier, Platform, QueueType, Region, RiotClient};
use crate::storage::{RecordKind, RecordStore};

pub const ACCOUNT_TTL: Duration = Duration::from_secs(24 * 3600);
pub const SUMMONER_TTL: Duration = Duration::from_secs(24 * 3600);
pub const LEAGUE_ENTRY_TTL: Duration = Duration::from_secs(60);
pub const MASTERY_TTL: Duration = Duration::from_secs(24 * 3600);

/// Masteries kept on a profile.
const TOP_MASTERIES: usize = 5;

/// Default number of leaderboard rows.
pub const LEADERBOARD_SIZE: usize = 50;

/// Everything shown for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub account: Account,
    pub summoner: Summoner,
    pub solo_queue: Option<LeagueEntry>,
    pub top_masteries: Vec<ChampionMastery>,
}

/// One challenger on the leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub puuid: String,
    /// `None` when the account could not be resolved.
    pub account: Option<Account>,
    pub profile_icon_id: Option<i64>,
    pub summoner_level: Option<i64>,
    pub league_points: i32,
    pub wins: i32,
    pub losses: i32,
    pub winrate: f64,
}

impl LeaderboardEntry {
    fn new(item: LeagueItem, account: Option<Account>, summoner: Option<Summoner>) -> Self {
        let wins = u32::try_from(item.wins).unwrap_or(0);
        let losses = u32::try_from(item.losses).unwrap_or(0);
        Self {
            puuid: item.puuid,
            account,
            profile_icon_id: summoner.as_ref().map(|s| s.profile_icon_id),
            summoner_level: summoner.as_ref().map(|s| s.summoner_level),
            league_points: item.league_points,
            wins: item.wins,
            losses: item.losses,
            winrate: percentage(wins, wins + losses),
        }
    }

    /// `gameName#tagLine`, or `Unknown` for an unresolved player.
    pub fn display_name(&self) -> String {
        self.account
            .as_ref()
            .map(Account::riot_id)
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

pub struct PlayerLookup {
    client: RiotClient,
    store: RecordStore,
    platform: Platform,
    region: Region,
}

impl PlayerLookup {
    pub fn new(client: RiotClient, store: RecordStore, platform: Platform, region: Region) -> Self {
        Self {
            client,
            store,
            platform,
            region,
        }
    }

    /// Resolve `gameName#tagLine`.
    pub async fn by_riot_id(
        &self,
        game_name: &str,
        tag_line: &str,
    ) -> Result<Option<PlayerProfile>, CollectError> {
        let key = riot_id_key(game_name, tag_line);
        let account = match self.store.get::<Account>(RecordKind::Account, &key).await? {
            Some(cached) if cached.is_fresh(ACCOUNT_TTL) => cached.value,
            _ => {
                info!(game_name, tag_line, "Fetching account");
                let Some(account) = self
                    .client
                    .account_by_riot_id(game_name, tag_line, self.region)
                    .await?
                else {
                    return Ok(None);
                };
                self.store_account(&key, &account).await?;
                account
            }
        };

        let (summoner, solo_queue, top_masteries) = tokio::try_join!(
            self.summoner(&account.puuid),
            self.solo_queue(&account.puuid),
            self.top_masteries(&account.puuid),
        )?;

        Ok(summoner.map(|summoner| PlayerProfile {
            account,
            summoner,
            solo_queue,
            top_masteries,
        }))
    }

    /// Resolve a known player id.
    pub async fn by_puuid(&self, puuid: &str) -> Result<Option<PlayerProfile>, CollectError> {
        // Regional and platform hosts are separate partitions, so these
        // two run side by side.
        let (account, summoner) = tokio::try_join!(self.account(puuid), self.summoner(puuid))?;
        let (Some(account), Some(summoner)) = (account, summoner) else {
            return Ok(None);
        };

        let (solo_queue, top_masteries) =
            tokio::try_join!(self.solo_queue(puuid), self.top_masteries(puuid))?;

        Ok(Some(PlayerProfile {
            account,
            summoner,
            solo_queue,
            top_masteries,
        }))
    }

    /// Challengers of `queue` on this platform, highest league points
    /// first, at most `limit` of them.
    ///
    /// Names come from the account cache or are fetched. A player whose
    /// account cannot be resolved stays on the board without a name.
    pub async fn leaderboard(
        &self,
        queue: QueueType,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, CollectError> {
        let Some(league) = self
            .client
            .league(ApexTier::Challenger, queue, self.platform)
            .await?
        else {
            return Ok(Vec::new());
        };

        let mut items = league.entries;
        items.sort_by(|a, b| b.league_points.cmp(&a.league_points));
        items.truncate(limit);

        let mut board = Vec::with_capacity(items.len());
        for item in items {
            let resolved = tokio::try_join!(self.account(&item.puuid), self.summoner(&item.puuid));
            let (account, summoner) = match resolved {
                Ok(pair) => pair,
                Err(e) => {
                    warn!(puuid = %item.puuid, error = %e, "Leaderboard player not resolved");
                    (None, None)
                }
            };
            board.push(LeaderboardEntry::new(item, account, summoner));
        }

        info!(platform = %self.platform, players = board.len(), "Leaderboard built");
        Ok(board)
    }

    async fn account(&self, puuid: &str) -> Result<Option<Account>, CollectError> {
        if let Some(cached) = self.store.get::<Account>(RecordKind::Account, puuid).await? {
            if cached.is_fresh(ACCOUNT_TTL) {
                return Ok(Some(cached.value));
            }
        }
        let Some(account) = self.client.account_by_puuid(puuid, self.region).await? else {
            return Ok(None);
        };
        let key = riot_id_key(&account.game_name, &account.tag_line);
        self.store_account(&key, &account).await?;
        Ok(Some(account))
    }

    /// Store under both the riot id and the player id.
    async fn store_account(&self, riot_id_key: &str, account: &Account) -> Result<(), CollectError> {
        self.store
            .upsert(RecordKind::Account, riot_id_key, account)
            .await?;
        self.store
            .upsert(RecordKind::Account, &account.puuid, account)
            .await?;
        Ok(())
    }

    async fn summoner(&self, puuid: &str) -> Result<Option<Summoner>, CollectError> {
        if let Some(cached) = self.store.get::<Summoner>(RecordKind::Summoner, puuid).await? {
            if cached.is_fresh(SUMMONER_TTL) {
                return Ok(Some(cached.value));
            }
        }
        let Some(summoner) = self.client.summoner_by_puuid(puuid, self.platform).await? else {
            return Ok(None);
        };
        self.store
            .upsert(RecordKind::Summoner, puuid, &summoner)
            .await?;
        Ok(Some(summoner))
    }

    /// Ranked solo standing. When Riot no longer lists a solo entry, the
    /// last stored one is returned, however old.
    async fn solo_queue(&self, puuid: &str) -> Result<Option<LeagueEntry>, CollectError> {
        let cached = self
            .store
            .get::<LeagueEntry>(RecordKind::LeagueEntry, puuid)
            .await?;
        if let Some(entry) = cached.as_ref().filter(|c| c.is_fresh(LEAGUE_ENTRY_TTL)) {
            return Ok(Some(entry.value.clone()));
        }

        let Some(entries) = self
            .client
            .league_entries_by_puuid(puuid, self.platform)
            .await?
        else {
            return Ok(None);
        };

        let solo = entries
            .into_iter()
            .find(|e| e.queue_type == QueueType::RankedSolo.as_str());
        match solo {
            Some(entry) => {
                self.store
                    .upsert(RecordKind::LeagueEntry, puuid, &entry)
                    .await?;
                Ok(Some(entry))
            }
            None => {
                debug!(puuid, "No ranked solo entry listed");
                Ok(cached.map(|c| c.value))
            }
        }
    }

    /// Highest-point masteries.
    async fn top_masteries(&self, puuid: &str) -> Result<Vec<ChampionMastery>, CollectError> {
        let mut masteries = match self
            .store
            .get::<Vec<ChampionMastery>>(RecordKind::Masteries, puuid)
            .await?
        {
            Some(cached) if cached.is_fresh(MASTERY_TTL) => cached.value,
            _ => {
                let fetched = self
                    .client
                    .champion_masteries_by_puuid(puuid, self.platform)
                    .await?
                    .unwrap_or_default();
                self.store
                    .upsert(RecordKind::Masteries, puuid, &fetched)
                    .await?;
                fetched
            }
        };

        masteries.sort_by(|a, b| b.champion_points.cmp(&a.champion_points));
        masteries.truncate(TOP_MASTERIES);
        Ok(masteries)
    }
}

fn riot_id_key(game_name: &str, tag_line: &str) -> String {
    format!("riot-id:{}#{}", game_name.to_lowercase(), tag_line.to_lowercase())
}
