//! Routing values used as rate-limit partitions.
//!
//! Riot splits its API across platform hosts (`eun1`, `kr`, ...) for
//! summoner/league data and regional hosts (`europe`, `asia`, ...) for
//! account and match data. Each host has its own quota, so the routing value
//! doubles as the gateway's partition key.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Platform routing value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Na1,
    Br1,
    Eun1,
    Euw1,
    Jp1,
    Kr,
    La1,
    La2,
    Oc1,
    Tr1,
    Ru1,
}

impl Platform {
    pub const ALL: [Platform; 11] = [
        Platform::Na1,
        Platform::Br1,
        Platform::Eun1,
        Platform::Euw1,
        Platform::Jp1,
        Platform::Kr,
        Platform::La1,
        Platform::La2,
        Platform::Oc1,
        Platform::Tr1,
        Platform::Ru1,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Na1 => "na1",
            Platform::Br1 => "br1",
            Platform::Eun1 => "eun1",
            Platform::Euw1 => "euw1",
            Platform::Jp1 => "jp1",
            Platform::Kr => "kr",
            Platform::La1 => "la1",
            Platform::La2 => "la2",
            Platform::Oc1 => "oc1",
            Platform::Tr1 => "tr1",
            Platform::Ru1 => "ru1",
        }
    }

    /// Regional routing value serving account and match data for this platform.
    pub fn region(&self) -> Region {
        match self {
            Platform::Na1 | Platform::Br1 | Platform::La1 | Platform::La2 => Region::Americas,
            Platform::Jp1 | Platform::Kr => Region::Asia,
            Platform::Eun1 | Platform::Euw1 | Platform::Tr1 | Platform::Ru1 => Region::Europe,
            Platform::Oc1 => Region::Sea,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str() == lower)
            .ok_or_else(|| format!("unknown platform: {}", s))
    }
}

/// Regional routing value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Americas,
    Asia,
    Europe,
    Sea,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Americas => "americas",
            Region::Asia => "asia",
            Region::Europe => "europe",
            Region::Sea => "sea",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "americas" => Ok(Region::Americas),
            "asia" => Ok(Region::Asia),
            "europe" => Ok(Region::Europe),
            "sea" => Ok(Region::Sea),
            _ => Err(format!("unknown region: {}", s)),
        }
    }
}

/// Ranked queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueueType {
    #[serde(rename = "RANKED_SOLO_5x5")]
    RankedSolo,
    #[serde(rename = "RANKED_FLEX_SR")]
    RankedFlex,
}

impl QueueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueType::RankedSolo => "RANKED_SOLO_5x5",
            QueueType::RankedFlex => "RANKED_FLEX_SR",
        }
    }

    /// Numeric queue id used by the match-v5 listing filter.
    pub fn queue_id(&self) -> u32 {
        match self {
            QueueType::RankedSolo => 420,
            QueueType::RankedFlex => 440,
        }
    }
}

impl fmt::Display for QueueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three apex leagues listed in full by the league-v4 API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApexTier {
    Challenger,
    Grandmaster,
    Master,
}

impl ApexTier {
    pub const ALL: [ApexTier; 3] = [ApexTier::Challenger, ApexTier::Grandmaster, ApexTier::Master];

    /// Path segment of the league listing endpoint.
    pub fn path_segment(&self) -> &'static str {
        match self {
            ApexTier::Challenger => "challengerleagues",
            ApexTier::Grandmaster => "grandmasterleagues",
            ApexTier::Master => "masterleagues",
        }
    }
}

impl fmt::Display for ApexTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApexTier::Challenger => write!(f, "challenger"),
            ApexTier::Grandmaster => write!(f, "grandmaster"),
            ApexTier::Master => write!(f, "master"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_round_trip_str() {
        for platform in Platform::ALL {
            assert_eq!(platform.as_str().parse::<Platform>(), Ok(platform));
        }
        assert_eq!("EUW1".parse::<Platform>(), Ok(Platform::Euw1));
        assert!("mars1".parse::<Platform>().is_err());
    }

    #[test]
    fn test_platform_region() {
        assert_eq!(Platform::Eun1.region(), Region::Europe);
        assert_eq!(Platform::Kr.region(), Region::Asia);
        assert_eq!(Platform::La2.region(), Region::Americas);
        assert_eq!(Platform::Oc1.region(), Region::Sea);
    }

    #[test]
    fn test_queue_type_serde() {
        let json = serde_json::to_string(&QueueType::RankedSolo).unwrap();
        assert_eq!(json, "\"RANKED_SOLO_5x5\"");
        assert_eq!(QueueType::RankedSolo.queue_id(), 420);
    }

    #[test]
    fn test_platform_deserialize_lowercase() {
        let p: Platform = serde_json::from_str("\"eun1\"").unwrap();
        assert_eq!(p, Platform::Eun1);
    }
}
