//! Analysis pipeline.
//!
//! Coordinates one analysis run:
//! 1. Discover apex-league players
//! 2. Collect their recent ranked matches
//! 3. Aggregate into a tier list
//! 4. Write the analysis artifact

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::time::interval;
use tracing::{error, info, warn};

use crate::calculate::aggregate;
use crate::collect::{CollectError, LeagueDiscovery, MatchCollector, MatchSource};
use crate::models::AnalysisReport;
use crate::riot::{Platform, QueueType, RiotClient, RiotError};
use crate::storage::{write_report, StorageError};

/// Errors that can occur during an analysis run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Discovery failed: {0}")]
    Discovery(#[from] RiotError),

    #[error("Collection failed: {0}")]
    Collect(#[from] CollectError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Analysis cancelled")]
    Cancelled,

    #[error("Analysis interval must be greater than zero")]
    ZeroInterval,
}

/// Configuration for analysis runs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub platform: Platform,
    pub queue: QueueType,
    pub matches_per_player: u32,
    /// Analyse at most this many players (sorted by id for repeatability).
    pub max_players: Option<usize>,
    pub output: PathBuf,
    /// Aggregate but do not write the artifact.
    pub dry_run: bool,
    pub interval: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            platform: Platform::Eun1,
            queue: QueueType::RankedSolo,
            matches_per_player: 10,
            max_players: None,
            output: PathBuf::from("./data/top_tier_analysis.json"),
            dry_run: false,
            interval: Duration::from_secs(6 * 3600),
        }
    }
}

/// Result of an analysis run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub players: usize,
    pub matches: u32,
    pub rows: usize,
    pub written: bool,
    pub duration: Duration,
}

pub struct AnalysisPipeline {
    config: PipelineConfig,
    client: RiotClient,
    source: Arc<dyn MatchSource>,
    cancel_token: Arc<RwLock<bool>>,
}

impl AnalysisPipeline {
    pub fn new(config: PipelineConfig, client: RiotClient, source: Arc<dyn MatchSource>) -> Self {
        Self {
            config,
            client,
            source,
            cancel_token: Arc::new(RwLock::new(false)),
        }
    }

    /// Stop the periodic loop after the current run.
    pub async fn cancel(&self) {
        *self.cancel_token.write().await = true;
    }

    /// Discover, collect and aggregate without writing anything.
    pub async fn analyze(&self) -> Result<(AnalysisReport, usize), PipelineError> {
        let discovery =
            LeagueDiscovery::new(self.client.clone(), self.config.platform, self.config.queue);
        let mut players: Vec<String> = discovery.discover().await?.into_iter().collect();
        players.sort();
        if let Some(max) = self.config.max_players {
            players.truncate(max);
        }
        info!(players = players.len(), "Collecting matches");

        if *self.cancel_token.read().await {
            return Err(PipelineError::Cancelled);
        }

        let collector = MatchCollector::new(self.source.clone(), self.config.matches_per_player);
        let matches = collector.collect(&players).await?;

        let report = aggregate(&matches).into_report(Utc::now());
        Ok((report, players.len()))
    }

    /// Run a single analysis.
    pub async fn run_once(&self) -> Result<RunSummary, PipelineError> {
        let start = std::time::Instant::now();
        info!(platform = %self.config.platform, "Starting analysis");

        let (report, players) = self.analyze().await?;

        let written = if self.config.dry_run {
            info!("Dry run, analysis not written");
            false
        } else {
            write_report(&self.config.output, &report).await?;
            true
        };

        let summary = RunSummary {
            players,
            matches: report.total_matches,
            rows: report.tierlist.len(),
            written,
            duration: start.elapsed(),
        };
        info!(
            "Analysis completed: {} players, {} matches, {} rows in {:?}",
            summary.players, summary.matches, summary.rows, summary.duration
        );
        Ok(summary)
    }

    /// Run analysis repeatedly until cancelled.
    pub async fn run_periodic(self: Arc<Self>) -> Result<(), PipelineError> {
        if self.config.interval.is_zero() {
            return Err(PipelineError::ZeroInterval);
        }
        let mut ticker = interval(self.config.interval);

        info!("Starting periodic analysis every {:?}", self.config.interval);

        loop {
            ticker.tick().await;

            if *self.cancel_token.read().await {
                info!("Periodic analysis stopped");
                break;
            }

            match self.run_once().await {
                Ok(_) => {}
                Err(PipelineError::Cancelled) => {
                    warn!("Periodic analysis cancelled");
                    break;
                }
                Err(e) => {
                    error!("Periodic analysis failed: {}", e);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::CachedMatchSource;
    use crate::models::fixtures::{match_with, participant};
    use crate::riot::transport::mock::MockTransport;
    use crate::riot::{Gateway, GatewayConfig, Region};
    use crate::storage::{read_report, RecordStore};
    use serde_json::json;
    use tempfile::TempDir;

    fn league(puuids: &[&str]) -> serde_json::Value {
        let entries: Vec<_> = puuids
            .iter()
            .map(|p| {
                json!({"puuid": p, "leaguePoints": 1, "rank": "I", "wins": 1, "losses": 1,
                       "veteran": false, "inactive": false, "freshBlood": false, "hotStreak": false})
            })
            .collect();
        json!({"leagueId": "l", "tier": "T", "queue": "RANKED_SOLO_5x5", "name": "n", "entries": entries})
    }

    /// Two challengers sharing one of their two games.
    fn scripted() -> Arc<MockTransport> {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(
            "/lol/league/v4/challengerleagues/by-queue/RANKED_SOLO_5x5",
            league(&["p1", "p2"]),
        );
        transport.push_json(
            "/lol/match/v5/matches/by-puuid/p1/ids?queue=420&count=10",
            json!(["EUN1_1", "EUN1_2"]),
        );
        transport.push_json(
            "/lol/match/v5/matches/by-puuid/p2/ids?queue=420&count=10",
            json!(["EUN1_2", "EUN1_3"]),
        );
        for id in 1..=3 {
            let m = match_with(
                id,
                vec![
                    participant(266, "Aatrox", 100, true).at("TOP"),
                    participant(122, "Darius", 200, false).at("TOP"),
                ],
                &[157],
            );
            transport.push_json(
                &format!("/lol/match/v5/matches/EUN1_{}", id),
                serde_json::to_value(&m).unwrap(),
            );
        }
        transport
    }

    fn pipeline(transport: Arc<MockTransport>, dir: &TempDir, config: PipelineConfig) -> AnalysisPipeline {
        let client = RiotClient::new(Gateway::new(transport, GatewayConfig::default()));
        let source = Arc::new(CachedMatchSource::new(
            client.clone(),
            RecordStore::new(dir.path().join("records")),
            Region::Europe,
        ));
        AnalysisPipeline::new(config, client, source)
    }

    #[tokio::test]
    async fn test_run_once_writes_artifact() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("top_tier_analysis.json");
        let config = PipelineConfig {
            output: output.clone(),
            ..Default::default()
        };

        let summary = pipeline(scripted(), &dir, config).run_once().await.unwrap();
        assert_eq!(summary.players, 2);
        assert_eq!(summary.matches, 3);
        assert_eq!(summary.rows, 2);
        assert!(summary.written);

        let report = read_report(&output).await.unwrap();
        assert_eq!(report.total_matches, 3);
        assert_eq!(report.champion_stats["Aatrox"].games, 3);
        assert_eq!(report.champion_stats["Aatrox"].matchups[0].champion_name, "Darius");
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.json");
        let config = PipelineConfig {
            output: output.clone(),
            dry_run: true,
            ..Default::default()
        };

        let summary = pipeline(scripted(), &dir, config).run_once().await.unwrap();
        assert!(!summary.written);
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_max_players_caps_population() {
        let dir = TempDir::new().unwrap();
        let transport = scripted();
        let config = PipelineConfig {
            output: dir.path().join("out.json"),
            max_players: Some(1),
            ..Default::default()
        };

        let summary = pipeline(transport.clone(), &dir, config).run_once().await.unwrap();
        assert_eq!(summary.players, 1);
        assert_eq!(summary.matches, 2);
        assert_eq!(
            transport.calls_to("/lol/match/v5/matches/by-puuid/p2/ids?queue=420&count=10"),
            0
        );
    }

    #[tokio::test]
    async fn test_cancelled_pipeline_stops() {
        let dir = TempDir::new().unwrap();
        let p = pipeline(scripted(), &dir, PipelineConfig::default());
        p.cancel().await;
        assert!(matches!(p.analyze().await, Err(PipelineError::Cancelled)));
    }

    #[tokio::test]
    async fn test_zero_interval_is_rejected() {
        let dir = TempDir::new().unwrap();
        let transport = scripted();
        let config = PipelineConfig {
            interval: crate::parse_duration("0s").unwrap(),
            ..Default::default()
        };
        let p = Arc::new(pipeline(transport.clone(), &dir, config));

        let result = tokio::spawn(p.run_periodic()).await.unwrap();
        assert!(matches!(result, Err(PipelineError::ZeroInterval)));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_stops_when_cancelled() {
        let dir = TempDir::new().unwrap();
        let config = PipelineConfig {
            output: dir.path().join("out.json"),
            interval: Duration::from_secs(60),
            ..Default::default()
        };
        let p = Arc::new(pipeline(scripted(), &dir, config));
        p.cancel().await;

        assert!(p.clone().run_periodic().await.is_ok());
        assert!(!dir.path().join("out.json").exists());
    }

    #[tokio::test]
    async fn test_discovery_error_surfaces() {
        let dir = TempDir::new().unwrap();
        let transport = Arc::new(MockTransport::new());
        transport.push(
            "/lol/league/v4/masterleagues/by-queue/RANKED_SOLO_5x5",
            crate::riot::RawResponse::status(401),
        );
        let result = pipeline(transport, &dir, PipelineConfig::default()).run_once().await;
        assert!(matches!(result, Err(PipelineError::Discovery(_))));
    }
}
