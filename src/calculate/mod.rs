//! Statistics calculation engine.
//!
//! Turns a deduplicated match set into per champion/role statistics:
//! - Win, play and ban rates
//! - Core builds, situational items and lane matchups
//! - A tier label from `winrate + playrate`
//!
//! Every run recomputes everything from the match set.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use crate::collect::MatchSet;
use crate::models::{
    AnalysisReport, ChampionStats, CoreBuild, Match, Matchup, Participant, Role, SituationalItem,
    Tier, TierListRow,
};

const CORE_BUILD_SIZE: usize = 3;
const TOP_BUILDS: usize = 3;
const TOP_SITUATIONAL: usize = 5;
const TOP_MATCHUPS: usize = 5;

/// `part / whole` as a percentage; zero when `whole` is zero.
pub fn percentage(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

/// Times each champion was banned. A skipped ban arrives as `-1` or `0`;
/// neither is counted.
pub fn ban_counts<'a>(matches: impl IntoIterator<Item = &'a Match>) -> HashMap<i32, u32> {
    let mut counts = HashMap::new();
    for m in matches {
        for team in &m.info.teams {
            for ban in &team.bans {
                if ban.champion_id > 0 {
                    *counts.entry(ban.champion_id).or_insert(0) += 1;
                }
            }
        }
    }
    counts
}

/// Games and wins for one key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Tally {
    games: u32,
    wins: u32,
}

impl Tally {
    fn record(&mut self, win: bool) {
        self.games += 1;
        if win {
            self.wins += 1;
        }
    }

    fn winrate(&self) -> f64 {
        percentage(self.wins, self.games)
    }
}

/// The `n` keys with the most games; ties go to the smaller key.
fn top_n<K: Ord>(tallies: HashMap<K, Tally>, n: usize) -> Vec<(K, Tally)> {
    let mut entries: Vec<(K, Tally)> = tallies.into_iter().collect();
    entries.sort_by(|(ka, a), (kb, b)| b.games.cmp(&a.games).then_with(|| ka.cmp(kb)));
    entries.truncate(n);
    entries
}

/// Running totals for one (champion, role) group.
#[derive(Debug, Default)]
struct GroupAccumulator {
    champion_name: String,
    games: Tally,
    kills: u64,
    deaths: u64,
    assists: u64,
    builds: HashMap<Vec<u32>, Tally>,
    situational: HashMap<u32, Tally>,
    matchups: HashMap<String, Tally>,
}

impl GroupAccumulator {
    fn add(&mut self, p: &Participant, m: &Match) {
        if self.champion_name.is_empty() {
            self.champion_name = p.champion_name.clone();
        }
        self.games.record(p.win);
        self.kills += u64::from(p.kills);
        self.deaths += u64::from(p.deaths);
        self.assists += u64::from(p.assists);

        let items = p.items();
        if items.len() >= CORE_BUILD_SIZE {
            let mut core = items[..CORE_BUILD_SIZE].to_vec();
            core.sort_unstable();
            self.builds.entry(core).or_default().record(p.win);
        }
        for item in items.iter().skip(CORE_BUILD_SIZE) {
            self.situational.entry(*item).or_default().record(p.win);
        }

        let opponent = m
            .info
            .participants
            .iter()
            .find(|o| o.team_position == p.team_position && o.team_id != p.team_id);
        if let Some(opponent) = opponent.filter(|o| !o.champion_name.is_empty()) {
            self.matchups
                .entry(opponent.champion_name.clone())
                .or_default()
                .record(p.win);
        }
    }

    fn finish(self, role: Role, bans: u32, total_games: u32) -> (TierListRow, ChampionStats) {
        let n = self.games.games;
        let winrate = self.games.winrate();
        let playrate = percentage(n, total_games);
        let banrate = percentage(bans, total_games);
        let tier = Tier::from_score(winrate + playrate);
        let average = |sum: u64| if n == 0 { 0.0 } else { sum as f64 / n as f64 };

        let core_builds = top_n(self.builds, TOP_BUILDS)
            .into_iter()
            .map(|(items, tally)| CoreBuild {
                items,
                winrate: tally.winrate(),
                playrate: percentage(tally.games, n),
            })
            .collect();
        let situational_items = top_n(self.situational, TOP_SITUATIONAL)
            .into_iter()
            .map(|(item_id, tally)| SituationalItem {
                item_id,
                winrate: tally.winrate(),
                playrate: percentage(tally.games, n),
            })
            .collect();
        let matchups = top_n(self.matchups, TOP_MATCHUPS)
            .into_iter()
            .map(|(name, tally)| Matchup {
                champion_id: name.clone(),
                champion_name: name,
                winrate: tally.winrate(),
                playrate: percentage(tally.games, n),
            })
            .collect();

        let row = TierListRow {
            champion_id: self.champion_name.clone(),
            champion_name: self.champion_name.clone(),
            role,
            winrate,
            games: n,
            tier,
            banrate,
        };
        let stats = ChampionStats {
            name: self.champion_name,
            title: String::new(),
            role,
            winrate,
            playrate,
            banrate,
            avg_kills: average(self.kills),
            avg_deaths: average(self.deaths),
            avg_assists: average(self.assists),
            core_builds,
            situational_items,
            matchups,
            games: n,
        };
        (row, stats)
    }
}

/// Result of one aggregation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    /// One row per champion and role, best tier first.
    pub tierlist: Vec<TierListRow>,
    /// Per champion name, the role with the most games.
    pub champion_stats: BTreeMap<String, ChampionStats>,
    pub total_matches: u32,
}

impl Aggregation {
    pub fn into_report(self, updated_at: DateTime<Utc>) -> AnalysisReport {
        AnalysisReport {
            tierlist: self.tierlist,
            champion_stats: self.champion_stats,
            total_matches: self.total_matches,
            updated_at,
        }
    }
}

/// Aggregate a match set.
///
/// Participants are grouped by champion and normalized role. A participant
/// without a team position is left out of every group but its match still
/// counts toward the total.
pub fn aggregate(matches: &MatchSet) -> Aggregation {
    let total_matches = matches.len() as u32;
    let bans = ban_counts(matches.iter());

    let mut groups: BTreeMap<(i32, Role), GroupAccumulator> = BTreeMap::new();
    for m in matches.iter() {
        for p in &m.info.participants {
            let Some(role) = Role::from_team_position(p.team_position.as_deref()) else {
                continue;
            };
            groups.entry((p.champion_id, role)).or_default().add(p, m);
        }
    }

    let mut tierlist = Vec::with_capacity(groups.len());
    let mut champion_stats: BTreeMap<String, ChampionStats> = BTreeMap::new();

    for ((champion_id, role), group) in groups {
        let banned = bans.get(&champion_id).copied().unwrap_or(0);
        let (row, stats) = group.finish(role, banned, total_matches);
        tierlist.push(row);

        let replace = champion_stats
            .get(&stats.name)
            .map_or(true, |existing| stats.games > existing.games);
        if replace {
            champion_stats.insert(stats.name.clone(), stats);
        }
    }

    tierlist.sort_by(|a, b| {
        a.tier
            .cmp(&b.tier)
            .then_with(|| b.games.cmp(&a.games))
            .then_with(|| a.champion_name.cmp(&b.champion_name))
            .then_with(|| a.role.cmp(&b.role))
    });

    Aggregation {
        tierlist,
        champion_stats,
        total_matches,
    }
}
