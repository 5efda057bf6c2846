//! Match-v5 DTOs.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Value of `info.endOfGameResult` for a game that finished normally.
pub const GAME_COMPLETE: &str = "GameComplete";

/// Full match record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub metadata: MatchMetadata,
    pub info: MatchInfo,
}

impl Match {
    pub fn match_id(&self) -> &str {
        &self.metadata.match_id
    }

    pub fn game_id(&self) -> i64 {
        self.info.game_id
    }

    /// Whether the game ran to completion. Only complete matches are served
    /// from cache.
    pub fn is_complete(&self) -> bool {
        self.info.end_of_game_result.as_deref() == Some(GAME_COMPLETE)
    }

    pub fn participant(&self, puuid: &str) -> Option<&Participant> {
        self.info.participants.iter().find(|p| p.puuid == puuid)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchMetadata {
    pub data_version: String,
    /// Normally `"EUN1_123"`; numeric ids are accepted and stringified.
    #[serde(deserialize_with = "string_or_number")]
    pub match_id: String,
    pub participants: Vec<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInfo {
    pub game_creation: i64,
    pub game_duration: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_end_timestamp: Option<i64>,
    pub game_id: i64,
    pub game_mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_name: Option<String>,
    pub game_start_timestamp: i64,
    pub game_type: String,
    pub game_version: String,
    pub map_id: i32,
    pub participants: Vec<Participant>,
    pub platform_id: String,
    pub queue_id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tournament_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_of_game_result: Option<String>,
    pub teams: Vec<Team>,
}

/// One player's record in a match.
///
/// Identity, champion, team and result are required. Counters default to
/// zero because Riot omits them in some modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub puuid: String,
    pub champion_id: i32,
    pub champion_name: String,
    pub team_id: i32,
    pub win: bool,

    #[serde(default)]
    pub kills: u32,
    #[serde(default)]
    pub deaths: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub champ_level: u32,
    #[serde(default)]
    pub gold_earned: u32,
    #[serde(default)]
    pub total_damage_dealt_to_champions: u64,
    #[serde(default)]
    pub total_minions_killed: u32,
    #[serde(default)]
    pub neutral_minions_killed: u32,
    #[serde(default)]
    pub vision_score: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub individual_position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub riot_id_game_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub riot_id_tagline: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item0: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item1: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item2: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item3: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item4: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item5: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item6: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenges: Option<Challenges>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perks: Option<Perks>,
}

impl Participant {
    /// Item slots 0..=5 in slot order. Slot 6 is the trinket and is skipped.
    pub fn item_slots(&self) -> [Option<u32>; 6] {
        [
            self.item0, self.item1, self.item2, self.item3, self.item4, self.item5,
        ]
    }

    /// Occupied item slots (non-zero ids) in slot order.
    pub fn items(&self) -> Vec<u32> {
        self.item_slots()
            .into_iter()
            .flatten()
            .filter(|id| *id != 0)
            .collect()
    }
}

/// Per-participant challenge statistics.
///
/// Only the fields read locally are typed. Everything else Riot sends is kept
/// in `extra`, so new or renamed challenges never fail validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kda: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kill_participation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_per_minute: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gold_per_minute: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vision_score_per_minute: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerkStats {
    pub defense: i32,
    pub flex: i32,
    pub offense: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerkSelection {
    pub perk: i32,
    pub var1: i32,
    pub var2: i32,
    pub var3: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerkStyle {
    pub description: String,
    pub selections: Vec<PerkSelection>,
    pub style: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Perks {
    pub stat_perks: PerkStats,
    pub styles: Vec<PerkStyle>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ban {
    /// `-1` means the team skipped this ban.
    pub champion_id: i32,
    pub pick_turn: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kills: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Objectives {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baron: Option<Objective>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub champion: Option<Objective>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dragon: Option<Objective>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horde: Option<Objective>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inhibitor: Option<Objective>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rift_herald: Option<Objective>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tower: Option<Objective>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    #[serde(default)]
    pub bans: Vec<Ban>,
    pub objectives: Objectives,
    pub team_id: i32,
    pub win: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::sample_match_json;
    use crate::riot::{validate, EndpointFamily};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_sample_match() {
        let m: Match = serde_json::from_value(sample_match_json()).unwrap();
        assert_eq!(m.match_id(), "EUN1_3700000001");
        assert_eq!(m.game_id(), 3700000001);
        assert_eq!(m.info.participants.len(), 2);
        assert_eq!(m.info.teams.len(), 2);
        assert!(m.is_complete());
    }

    #[test]
    fn test_validated_match_reserializes_same_identity() {
        let m: Match = validate(EndpointFamily::Match, sample_match_json()).unwrap();
        let round: Match = serde_json::from_value(serde_json::to_value(&m).unwrap()).unwrap();

        assert_eq!(round.match_id(), m.match_id());
        assert_eq!(round.info.participants.len(), m.info.participants.len());
        assert_eq!(round.info.teams.len(), m.info.teams.len());
    }

    #[test]
    fn test_numeric_match_id_is_stringified() {
        let mut payload = sample_match_json();
        payload["metadata"]["matchId"] = serde_json::json!(42);
        let m: Match = serde_json::from_value(payload).unwrap();
        assert_eq!(m.match_id(), "42");
    }

    #[test]
    fn test_incomplete_game() {
        let mut payload = sample_match_json();
        payload["info"]["endOfGameResult"] = serde_json::json!("Abort_Unexpected");
        let m: Match = serde_json::from_value(payload.clone()).unwrap();
        assert!(!m.is_complete());

        payload["info"].as_object_mut().unwrap().remove("endOfGameResult");
        let m: Match = serde_json::from_value(payload).unwrap();
        assert!(!m.is_complete());
    }

    #[test]
    fn test_challenges_keep_unknown_fields() {
        let m: Match = serde_json::from_value(sample_match_json()).unwrap();
        let challenges = m.info.participants[0].challenges.as_ref().unwrap();
        assert_eq!(challenges.kda, Some(4.5));
        assert_eq!(challenges.extra["SWARM_DefeatAatrox"], 0);
        assert_eq!(challenges.extra["legendaryItemUsed"][0], 3031);
    }

    #[test]
    fn test_items_skip_empty_slots_and_trinket() {
        let m: Match = serde_json::from_value(sample_match_json()).unwrap();
        // item2 is 0 and item6 is the trinket.
        assert_eq!(m.info.participants[0].items(), vec![3078, 3047, 6333, 3053]);
    }
}
