//! Player-facing DTOs: account, summoner, ranked entries, masteries and
//! league listings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Riot account (`/riot/account/v1/accounts/...`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub puuid: String,
    pub game_name: String,
    pub tag_line: String,
}

impl Account {
    /// `gameName#tagLine`
    pub fn riot_id(&self) -> String {
        format!("{}#{}", self.game_name, self.tag_line)
    }
}

/// Summoner profile on one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summoner {
    pub puuid: String,
    pub profile_icon_id: i64,
    pub revision_date: i64,
    pub summoner_level: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiniSeries {
    pub losses: i32,
    pub progress: String,
    pub target: i32,
    pub wins: i32,
}

/// A player's standing in one ranked queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueEntry {
    pub league_id: String,
    pub puuid: String,
    pub queue_type: String,
    pub tier: String,
    pub rank: String,
    pub league_points: i32,
    pub wins: i32,
    pub losses: i32,
    pub hot_streak: bool,
    pub veteran: bool,
    pub fresh_blood: bool,
    pub inactive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mini_series: Option<MiniSeries>,
}

/// Season milestone progress. Riot keeps adding fields here, so anything
/// beyond the known ones is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextSeasonMilestone {
    pub reward_marks: i32,
    pub bonus: bool,
    pub total_games_requires: i32,
    #[serde(default)]
    pub require_grade_counts: Value,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChampionMastery {
    pub puuid: String,
    pub champion_points_until_next_level: i64,
    pub champion_id: i32,
    pub last_play_time: i64,
    pub champion_level: i32,
    pub champion_points: i64,
    pub champion_points_since_last_level: i64,
    pub mark_required_for_next_level: i32,
    pub champion_season_milestone: i32,
    pub next_season_milestone: NextSeasonMilestone,
    pub tokens_earned: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone_grades: Option<Vec<String>>,
}

/// One player inside an apex league listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueItem {
    pub puuid: String,
    pub league_points: i32,
    pub rank: String,
    pub wins: i32,
    pub losses: i32,
    pub veteran: bool,
    pub inactive: bool,
    pub fresh_blood: bool,
    pub hot_streak: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mini_series: Option<MiniSeries>,
}

/// Challenger / grandmaster / master listing for a queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueList {
    pub league_id: String,
    pub tier: String,
    pub queue: String,
    pub name: String,
    pub entries: Vec<LeagueItem>,
}
