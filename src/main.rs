use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rift_meta::api::{build_router, state::AppState};
use rift_meta::collect::{
    match_history, CachedMatchSource, MatchSource, PlayerLookup, LEADERBOARD_SIZE,
};
use rift_meta::config::AppConfig;
use rift_meta::parse_interval;
use rift_meta::pipeline::{AnalysisPipeline, PipelineConfig};
use rift_meta::riot::{Gateway, HttpTransport, Platform, RiotClient};
use rift_meta::storage::{AnalysisCache, RecordStore};

#[derive(Parser)]
#[command(name = "rift-meta")]
#[command(about = "High-elo League of Legends tier lists from the Riot API")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the tier list from apex-league matches
    Analyze {
        /// Where to write the analysis (default: <data-dir>/top_tier_analysis.json)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Analyse at most this many players
        #[arg(long)]
        max_players: Option<usize>,

        /// Run continuously at interval
        #[arg(long)]
        watch: bool,

        /// Analysis interval (e.g., "6h", "30m"); must be greater than zero
        #[arg(long, default_value = "6h")]
        interval: String,

        /// Aggregate but don't write the artifact
        #[arg(long)]
        dry_run: bool,
    },

    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,
    },

    /// Show the challenger leaderboard
    Leaderboard {
        /// Number of players to show
        #[arg(long, default_value_t = LEADERBOARD_SIZE)]
        limit: usize,

        /// Platform to rank (default: the configured one)
        #[arg(long)]
        platform: Option<Platform>,
    },

    /// Show a player's recent ranked solo games
    History {
        puuid: String,

        /// Number of games
        #[arg(long, default_value = "10")]
        count: u32,
    },

    /// Print one match as JSON
    Match { match_id: String },

    /// Look up a player by Riot id
    Lookup {
        game_name: String,

        tag_line: String,

        /// Platform the player's account lives on
        #[arg(long)]
        platform: Option<Platform>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    let log_level = cli.log_level.unwrap_or_else(|| config.log_level.clone());

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting rift-meta v{}", env!("CARGO_PKG_VERSION"));

    let storage = config.storage();

    match cli.command {
        Commands::Analyze {
            output,
            max_players,
            watch,
            interval: interval_str,
            dry_run,
        } => {
            let Some(interval) = parse_interval(&interval_str) else {
                anyhow::bail!(
                    "invalid --interval {:?}: expected a non-zero duration like 6h, 30m or 90s",
                    interval_str
                );
            };

            let client = riot_client(&config)?;
            let source = Arc::new(CachedMatchSource::new(
                client.clone(),
                RecordStore::new(storage.records_dir()),
                config.riot.region(),
            ));

            let pipeline_config = PipelineConfig {
                platform: config.riot.platform,
                queue: config.riot.queue,
                matches_per_player: config.analysis.matches_per_player,
                max_players: max_players.or(config.analysis.max_players),
                output: output.unwrap_or_else(|| storage.analysis_path()),
                dry_run,
                interval,
            };
            let pipeline = AnalysisPipeline::new(pipeline_config, client, source);

            if watch {
                tracing::info!("Running periodic analysis (interval: {})...", interval_str);
                Arc::new(pipeline).run_periodic().await?;
            } else {
                let summary = pipeline.run_once().await?;
                println!("\n=== Analysis Results ===");
                println!("Players:          {}", summary.players);
                println!("Matches:          {}", summary.matches);
                println!("Tier-list rows:   {}", summary.rows);
                println!("Duration:         {:?}", summary.duration);
                if !summary.written {
                    println!("\n(dry run - no data written to disk)");
                }
            }
        }
        Commands::Serve { host, port } => {
            let state = AppState {
                analysis: Arc::new(AnalysisCache::new(
                    storage.analysis_path(),
                    Duration::from_secs(config.analysis.freshness_seconds),
                )),
                min_games: config.analysis.min_games,
            };
            let app = build_router(state, config.server.cors_origin());
            let addr = format!(
                "{}:{}",
                host.unwrap_or_else(|| config.server.host.clone()),
                port.unwrap_or(config.server.port)
            );
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Leaderboard { limit, platform } => {
            let client = riot_client(&config)?;
            let (platform, region) = match platform {
                Some(p) => (p, p.region()),
                None => (config.riot.platform, config.riot.region()),
            };
            let lookup = PlayerLookup::new(
                client,
                RecordStore::new(storage.records_dir()),
                platform,
                region,
            );

            let board = lookup.leaderboard(config.riot.queue, limit).await?;
            println!("\n=== Challenger leaderboard ({}) ===", platform);
            for (rank, entry) in board.iter().enumerate() {
                println!(
                    "{:>3}. {:<28} {:>5} LP  {:>4}W {:>4}L  {:>5.1}%",
                    rank + 1,
                    entry.display_name(),
                    entry.league_points,
                    entry.wins,
                    entry.losses,
                    entry.winrate
                );
            }
        }
        Commands::History { puuid, count } => {
            let source = CachedMatchSource::new(
                riot_client(&config)?,
                RecordStore::new(storage.records_dir()),
                config.riot.region(),
            );

            let history = match_history(&source, &puuid, count).await?;
            if history.is_empty() {
                eprintln!("No ranked solo games for {}", puuid);
            }
            for m in &history {
                let Some(p) = m.participant(&puuid) else {
                    continue;
                };
                println!(
                    "{:<18} {:<14} {:>2}/{:>2}/{:>2}  {}",
                    m.metadata.match_id,
                    p.champion_name,
                    p.kills,
                    p.deaths,
                    p.assists,
                    if p.win { "Victory" } else { "Defeat" }
                );
            }
        }
        Commands::Match { match_id } => {
            let source = CachedMatchSource::new(
                riot_client(&config)?,
                RecordStore::new(storage.records_dir()),
                config.riot.region(),
            );

            match source.match_by_id(&match_id).await? {
                Some(m) => println!("{}", serde_json::to_string_pretty(&m)?),
                None => eprintln!("No match {}", match_id),
            }
        }
        Commands::Lookup {
            game_name,
            tag_line,
            platform,
        } => {
            let client = riot_client(&config)?;
            let (platform, region) = match platform {
                Some(p) => (p, p.region()),
                None => (config.riot.platform, config.riot.region()),
            };
            let lookup = PlayerLookup::new(
                client,
                RecordStore::new(storage.records_dir()),
                platform,
                region,
            );

            match lookup.by_riot_id(&game_name, &tag_line).await? {
                Some(profile) => println!("{}", serde_json::to_string_pretty(&profile)?),
                None => eprintln!("No player {}#{} on {}", game_name, tag_line, platform),
            }
        }
    }

    Ok(())
}

fn riot_client(config: &AppConfig) -> Result<RiotClient> {
    let api_key = config.riot.api_key()?;
    let transport = HttpTransport::new(config.riot.transport_config(api_key))?;
    Ok(RiotClient::new(Gateway::new(
        Arc::new(transport),
        config.riot.gateway_config(),
    )))
}
