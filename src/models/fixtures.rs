//! Builders for match records used across unit tests.

use serde_json::{json, Value};

use super::{Ban, Match, MatchInfo, MatchMetadata, Objectives, Participant, Team};

/// A two-player ranked match as Riot returns it (trimmed).
pub fn sample_match_json() -> Value {
    json!({
        "metadata": {
            "dataVersion": "2",
            "matchId": "EUN1_3700000001",
            "participants": ["puuid-a", "puuid-b"]
        },
        "info": {
            "gameCreation": 1_700_000_000_000i64,
            "gameDuration": 1830,
            "gameEndTimestamp": 1_700_000_001_900i64,
            "gameId": 3700000001i64,
            "gameMode": "CLASSIC",
            "gameName": "teambuilder-match-3700000001",
            "gameStartTimestamp": 1_700_000_000_050i64,
            "gameType": "MATCHED_GAME",
            "gameVersion": "14.20.123.4567",
            "mapId": 11,
            "platformId": "EUN1",
            "queueId": 420,
            "endOfGameResult": "GameComplete",
            "participants": [
                {
                    "puuid": "puuid-a",
                    "championId": 266,
                    "championName": "Aatrox",
                    "teamId": 100,
                    "win": true,
                    "kills": 7, "deaths": 2, "assists": 5,
                    "teamPosition": "TOP",
                    "individualPosition": "TOP",
                    "item0": 3078, "item1": 3047, "item2": 0,
                    "item3": 6333, "item4": 3053, "item5": 0, "item6": 3364,
                    "allInPings": 3,
                    "challenges": {
                        "kda": 4.5,
                        "SWARM_DefeatAatrox": 0,
                        "legendaryItemUsed": [3031]
                    },
                    "perks": {
                        "statPerks": {"defense": 5001, "flex": 5008, "offense": 5005},
                        "styles": [{
                            "description": "primaryStyle",
                            "selections": [{"perk": 8010, "var1": 1, "var2": 0, "var3": 0}],
                            "style": 8000
                        }]
                    }
                },
                {
                    "puuid": "puuid-b",
                    "championId": 122,
                    "championName": "Darius",
                    "teamId": 200,
                    "win": false,
                    "kills": 2, "deaths": 7, "assists": 1,
                    "teamPosition": "TOP",
                    "item0": 6630, "item1": 3047, "item2": 3053
                }
            ],
            "teams": [
                {
                    "bans": [{"championId": 157, "pickTurn": 1}, {"championId": -1, "pickTurn": 2}],
                    "objectives": {"baron": {"first": true, "kills": 1}},
                    "teamId": 100,
                    "win": true
                },
                {
                    "bans": [{"championId": 266, "pickTurn": 6}],
                    "objectives": {},
                    "teamId": 200,
                    "win": false
                }
            ]
        }
    })
}

/// Minimal participant; fill in what the test cares about.
pub fn participant(champion_id: i32, champion_name: &str, team_id: i32, win: bool) -> Participant {
    Participant {
        puuid: format!("{}-{}-{}", champion_name, team_id, champion_id),
        champion_id,
        champion_name: champion_name.to_string(),
        team_id,
        win,
        kills: 0,
        deaths: 0,
        assists: 0,
        champ_level: 0,
        gold_earned: 0,
        total_damage_dealt_to_champions: 0,
        total_minions_killed: 0,
        neutral_minions_killed: 0,
        vision_score: 0,
        team_position: None,
        individual_position: None,
        riot_id_game_name: None,
        riot_id_tagline: None,
        item0: None,
        item1: None,
        item2: None,
        item3: None,
        item4: None,
        item5: None,
        item6: None,
        challenges: None,
        perks: None,
    }
}

impl Participant {
    pub fn at(mut self, position: &str) -> Self {
        self.team_position = Some(position.to_string());
        self
    }

    pub fn with_items(mut self, items: &[u32]) -> Self {
        let mut slots = items.iter().copied().map(Some);
        self.item0 = slots.next().flatten();
        self.item1 = slots.next().flatten();
        self.item2 = slots.next().flatten();
        self.item3 = slots.next().flatten();
        self.item4 = slots.next().flatten();
        self.item5 = slots.next().flatten();
        self
    }

    pub fn with_kda(mut self, kills: u32, deaths: u32, assists: u32) -> Self {
        self.kills = kills;
        self.deaths = deaths;
        self.assists = assists;
        self
    }
}

/// A complete ranked match with the given participants. `bans` go to the
/// blue side.
pub fn match_with(game_id: i64, participants: Vec<Participant>, bans: &[i32]) -> Match {
    Match {
        metadata: MatchMetadata {
            data_version: "2".to_string(),
            match_id: format!("EUN1_{}", game_id),
            participants: participants.iter().map(|p| p.puuid.clone()).collect(),
        },
        info: MatchInfo {
            game_creation: 0,
            game_duration: 1800,
            game_end_timestamp: None,
            game_id,
            game_mode: "CLASSIC".to_string(),
            game_name: None,
            game_start_timestamp: 0,
            game_type: "MATCHED_GAME".to_string(),
            game_version: "14.20".to_string(),
            map_id: 11,
            participants,
            platform_id: "EUN1".to_string(),
            queue_id: 420,
            tournament_code: None,
            end_of_game_result: Some(super::GAME_COMPLETE.to_string()),
            teams: vec![
                Team {
                    bans: bans
                        .iter()
                        .enumerate()
                        .map(|(i, id)| Ban {
                            champion_id: *id,
                            pick_turn: i as i32 + 1,
                        })
                        .collect(),
                    objectives: Objectives::default(),
                    team_id: 100,
                    win: true,
                },
                Team {
                    bans: Vec::new(),
                    objectives: Objectives::default(),
                    team_id: 200,
                    win: false,
                },
            ],
        },
    }
}
