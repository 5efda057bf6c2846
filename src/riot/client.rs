//! Typed endpoint calls over the [`Gateway`].
//!
//! Each method builds the endpoint path, routes it to the right partition,
//! and validates the payload. `NotFound` becomes `Ok(None)`; every other
//! non-success outcome is an error naming the endpoint.

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::error;

use super::gateway::{Gateway, GatewayError};
use super::outcome::ApiOutcome;
use super::routing::{ApexTier, Platform, QueueType, Region};
use super::validate::{validate, EndpointFamily, ValidationFailure};
use crate::models::{Account, ChampionMastery, LeagueEntry, LeagueList, Match, Summoner};

/// Errors returned by typed Riot calls.
#[derive(Debug, Error)]
pub enum RiotError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Riot rejected {endpoint}: {message}")]
    Developer { endpoint: String, message: String },

    #[error("Riot service error on {endpoint}: {message}")]
    Service { endpoint: String, message: String },

    #[error("Unexpected payload from {endpoint}: {failure}")]
    Validation {
        endpoint: String,
        #[source]
        failure: ValidationFailure,
    },
}

/// Filters for the match-id listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchIdQuery {
    pub queue: Option<u32>,
    pub count: Option<u32>,
    pub start: Option<u32>,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
}

impl MatchIdQuery {
    /// Most recent `count` ranked solo games.
    pub fn ranked_solo(count: u32) -> Self {
        Self {
            queue: Some(QueueType::RankedSolo.queue_id()),
            count: Some(count),
            ..Default::default()
        }
    }

    fn to_query_string(&self) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        if let Some(queue) = self.queue {
            query.append_pair("queue", &queue.to_string());
        }
        if let Some(count) = self.count {
            query.append_pair("count", &count.to_string());
        }
        if let Some(start) = self.start {
            query.append_pair("start", &start.to_string());
        }
        if let Some(start_time) = self.start_time {
            query.append_pair("startTime", &start_time.to_string());
        }
        if let Some(end_time) = self.end_time {
            query.append_pair("endTime", &end_time.to_string());
        }
        query.finish()
    }
}

/// Percent-encode one path segment. Spaces become `%20`, not `+`.
fn encode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Riot API client. Cheap to clone; all clones share one gateway.
#[derive(Clone)]
pub struct RiotClient {
    gateway: Gateway,
}

impl RiotClient {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub async fn league_entries_by_puuid(
        &self,
        puuid: &str,
        platform: Platform,
    ) -> Result<Option<Vec<LeagueEntry>>, RiotError> {
        let path = format!("/lol/league/v4/entries/by-puuid/{}", puuid);
        self.fetch(EndpointFamily::LeagueEntries, platform.as_str(), path)
            .await
    }

    pub async fn champion_masteries_by_puuid(
        &self,
        puuid: &str,
        platform: Platform,
    ) -> Result<Option<Vec<ChampionMastery>>, RiotError> {
        let path = format!(
            "/lol/champion-mastery/v4/champion-masteries/by-puuid/{}",
            puuid
        );
        self.fetch(EndpointFamily::ChampionMasteries, platform.as_str(), path)
            .await
    }

    pub async fn summoner_by_puuid(
        &self,
        puuid: &str,
        platform: Platform,
    ) -> Result<Option<Summoner>, RiotError> {
        let path = format!("/lol/summoner/v4/summoners/by-puuid/{}", puuid);
        self.fetch(EndpointFamily::Summoner, platform.as_str(), path)
            .await
    }

    pub async fn account_by_puuid(
        &self,
        puuid: &str,
        region: Region,
    ) -> Result<Option<Account>, RiotError> {
        let path = format!("/riot/account/v1/accounts/by-puuid/{}", puuid);
        self.fetch(EndpointFamily::Account, region.as_str(), path)
            .await
    }

    pub async fn account_by_riot_id(
        &self,
        game_name: &str,
        tag_line: &str,
        region: Region,
    ) -> Result<Option<Account>, RiotError> {
        let path = format!(
            "/riot/account/v1/accounts/by-riot-id/{}/{}",
            encode_segment(game_name),
            encode_segment(tag_line)
        );
        self.fetch(EndpointFamily::Account, region.as_str(), path)
            .await
    }

    pub async fn match_ids_by_puuid(
        &self,
        puuid: &str,
        region: Region,
        query: &MatchIdQuery,
    ) -> Result<Option<Vec<String>>, RiotError> {
        let mut path = format!("/lol/match/v5/matches/by-puuid/{}/ids", puuid);
        let query = query.to_query_string();
        if !query.is_empty() {
            path.push('?');
            path.push_str(&query);
        }
        self.fetch(EndpointFamily::MatchIds, region.as_str(), path)
            .await
    }

    pub async fn match_by_id(
        &self,
        match_id: &str,
        region: Region,
    ) -> Result<Option<Match>, RiotError> {
        let path = format!("/lol/match/v5/matches/{}", encode_segment(match_id));
        self.fetch(EndpointFamily::Match, region.as_str(), path)
            .await
    }

    /// Full listing of an apex league.
    pub async fn league(
        &self,
        tier: ApexTier,
        queue: QueueType,
        platform: Platform,
    ) -> Result<Option<LeagueList>, RiotError> {
        let path = format!(
            "/lol/league/v4/{}/by-queue/{}",
            tier.path_segment(),
            queue.as_str()
        );
        self.fetch(EndpointFamily::LeagueList, platform.as_str(), path)
            .await
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        family: EndpointFamily,
        partition: &str,
        path: String,
    ) -> Result<Option<T>, RiotError> {
        match self.gateway.request(&path, partition).await? {
            ApiOutcome::Success(payload) => match validate(family, payload) {
                Ok(value) => Ok(Some(value)),
                Err(failure) => {
                    error!(
                        endpoint = %path,
                        family = %family,
                        field = failure.path().unwrap_or("?"),
                        "Payload validation failed"
                    );
                    Err(RiotError::Validation {
                        endpoint: path,
                        failure,
                    })
                }
            },
            ApiOutcome::NotFound => Ok(None),
            ApiOutcome::DeveloperError(message) => Err(RiotError::Developer {
                endpoint: path,
                message,
            }),
            ApiOutcome::ServiceError(message) => Err(RiotError::Service {
                endpoint: path,
                message,
            }),
            // The gateway resolves throttling itself and never hands this out.
            ApiOutcome::RateLimited { .. } => Err(RiotError::Service {
                endpoint: path,
                message: "rate limited".to_string(),
            }),
        }
    }
}
