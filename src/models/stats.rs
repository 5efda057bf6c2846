//! Derived statistics models.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized lane role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Top,
    Jungle,
    Mid,
    Adc,
    Support,
}

impl Role {
    /// Map Riot's `teamPosition`.
    ///
    /// Returns `None` for a missing or empty tag. Any unrecognised value
    /// (Arena and Swarm report their own) is treated as `MID`.
    pub fn from_team_position(position: Option<&str>) -> Option<Self> {
        let position = position.filter(|p| !p.is_empty())?;
        Some(match position {
            "TOP" => Role::Top,
            "JUNGLE" => Role::Jungle,
            "MIDDLE" => Role::Mid,
            "BOTTOM" => Role::Adc,
            "UTILITY" => Role::Support,
            _ => Role::Mid,
        })
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Top => write!(f, "TOP"),
            Role::Jungle => write!(f, "JUNGLE"),
            Role::Mid => write!(f, "MID"),
            Role::Adc => write!(f, "ADC"),
            Role::Support => write!(f, "SUPPORT"),
        }
    }
}

/// Tier classification based on win rate plus play rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    #[serde(rename = "S+")]
    SPlus,
    S,
    A,
    B,
    C,
    D,
}

impl Tier {
    /// Classify a score (`winrate + playrate`, both in percent).
    ///
    /// Thresholds are strict: a score of exactly 55 is `S`, not `S+`.
    pub fn from_score(score: f64) -> Self {
        if score > 55.0 {
            Tier::SPlus
        } else if score > 53.0 {
            Tier::S
        } else if score > 51.0 {
            Tier::A
        } else if score > 49.0 {
            Tier::B
        } else if score > 47.0 {
            Tier::C
        } else {
            Tier::D
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::SPlus => write!(f, "S+"),
            Tier::S => write!(f, "S"),
            Tier::A => write!(f, "A"),
            Tier::B => write!(f, "B"),
            Tier::C => write!(f, "C"),
            Tier::D => write!(f, "D"),
        }
    }
}

/// One row of the tier list, per champion and role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierListRow {
    /// Champion name; the front end keys assets by name.
    pub champion_id: String,
    pub champion_name: String,
    pub role: Role,
    pub winrate: f64,
    pub games: u32,
    pub tier: Tier,
    pub banrate: f64,
}

/// Three-item core build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreBuild {
    /// Sorted ascending.
    pub items: Vec<u32>,
    pub winrate: f64,
    pub playrate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SituationalItem {
    pub item_id: u32,
    pub winrate: f64,
    pub playrate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Matchup {
    /// Opponent champion name.
    pub champion_id: String,
    pub champion_name: String,
    pub winrate: f64,
    pub playrate: f64,
}

/// Detailed statistics for one champion in one role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChampionStats {
    pub name: String,
    #[serde(default)]
    pub title: String,
    pub role: Role,
    pub winrate: f64,
    pub playrate: f64,
    pub banrate: f64,
    pub avg_kills: f64,
    pub avg_deaths: f64,
    pub avg_assists: f64,
    pub core_builds: Vec<CoreBuild>,
    pub situational_items: Vec<SituationalItem>,
    pub matchups: Vec<Matchup>,
    pub games: u32,
}

/// The persisted analysis artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub tierlist: Vec<TierListRow>,
    /// Keyed by champion name; holds the role with the most games.
    pub champion_stats: BTreeMap<String, ChampionStats>,
    pub total_matches: u32,
    pub updated_at: DateTime<Utc>,
}

impl AnalysisReport {
    /// Case-insensitive lookup by champion name.
    pub fn champion(&self, name: &str) -> Option<&ChampionStats> {
        self.champion_stats.get(name).or_else(|| {
            self.champion_stats
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, stats)| stats)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_from_score() {
        assert_eq!(Tier::from_score(70.0), Tier::SPlus);
        assert_eq!(Tier::from_score(55.01), Tier::SPlus);
        assert_eq!(Tier::from_score(55.0), Tier::S);
        assert_eq!(Tier::from_score(53.0), Tier::A);
        assert_eq!(Tier::from_score(51.5), Tier::A);
        assert_eq!(Tier::from_score(49.0), Tier::C);
        assert_eq!(Tier::from_score(47.0), Tier::D);
        assert_eq!(Tier::from_score(0.0), Tier::D);
    }

    #[test]
    fn test_tier_display_and_serde() {
        assert_eq!(Tier::SPlus.to_string(), "S+");
        assert_eq!(serde_json::to_string(&Tier::SPlus).unwrap(), "\"S+\"");
        assert_eq!(serde_json::from_str::<Tier>("\"B\"").unwrap(), Tier::B);
    }

    #[test]
    fn test_tier_ordering() {
        assert!(Tier::SPlus < Tier::S);
        assert!(Tier::C < Tier::D);
    }

    #[test]
    fn test_role_mapping() {
        assert_eq!(Role::from_team_position(Some("TOP")), Some(Role::Top));
        assert_eq!(Role::from_team_position(Some("JUNGLE")), Some(Role::Jungle));
        assert_eq!(Role::from_team_position(Some("MIDDLE")), Some(Role::Mid));
        assert_eq!(Role::from_team_position(Some("BOTTOM")), Some(Role::Adc));
        assert_eq!(Role::from_team_position(Some("UTILITY")), Some(Role::Support));
        assert_eq!(Role::from_team_position(Some("NONE")), Some(Role::Mid));
        assert_eq!(Role::from_team_position(Some("")), None);
        assert_eq!(Role::from_team_position(None), None);
    }

    #[test]
    fn test_role_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Role::Adc).unwrap(), "\"ADC\"");
        assert_eq!(serde_json::to_string(&Role::Support).unwrap(), "\"SUPPORT\"");
    }

    #[test]
    fn test_report_champion_lookup_ignores_case() {
        let stats = ChampionStats {
            name: "LeeSin".to_string(),
            title: String::new(),
            role: Role::Jungle,
            winrate: 50.0,
            playrate: 5.0,
            banrate: 1.0,
            avg_kills: 5.0,
            avg_deaths: 4.0,
            avg_assists: 7.0,
            core_builds: vec![],
            situational_items: vec![],
            matchups: vec![],
            games: 12,
        };
        let report = AnalysisReport {
            tierlist: vec![],
            champion_stats: BTreeMap::from([("LeeSin".to_string(), stats)]),
            total_matches: 100,
            updated_at: Utc::now(),
        };

        assert!(report.champion("LeeSin").is_some());
        assert!(report.champion("leesin").is_some());
        assert!(report.champion("Teemo").is_none());
    }

    #[test]
    fn test_report_json_shape() {
        let report = AnalysisReport {
            tierlist: vec![TierListRow {
                champion_id: "Aatrox".to_string(),
                champion_name: "Aatrox".to_string(),
                role: Role::Top,
                winrate: 60.0,
                games: 10,
                tier: Tier::SPlus,
                banrate: 5.0,
            }],
            champion_stats: BTreeMap::new(),
            total_matches: 100,
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["tierlist"][0]["champion_id"], "Aatrox");
        assert_eq!(value["tierlist"][0]["tier"], "S+");
        assert_eq!(value["totalMatches"], 100);
        assert!(value["updatedAt"].is_string());
        assert!(value["championStats"].is_object());
    }
}
