use std::sync::Arc;

use anyhow::Context;
use chrono::Duration;
use storage::{
    Clock, DayBoundary, GameDay, KvStore, MemoryKvStore, RestKvStore, SegmentProvider, SystemClock,
    TtlCache,
    dto::{competition::CompetitionConfig, ranking::Rankings},
    models::{Roster, VotePolicy},
    services::trophies::CachedTrophies,
};
use strava::{StravaClient, StravaCredentials};

use crate::config::Config;

/// Daily game rules shared by every request.
pub struct GameSettings {
    pub roster: Roster,
    pub policy: VotePolicy,
    pub boundary: DayBoundary,
    pub stats_window_days: u32,
}

#[derive(Clone)]
pub struct AppState {
    pub kv: Arc<dyn KvStore>,
    pub provider: Arc<dyn SegmentProvider>,
    pub competition: Arc<CompetitionConfig>,
    pub game: Arc<GameSettings>,
    pub clock: Arc<dyn Clock>,
    pub rankings_cache: Arc<TtlCache<Rankings>>,
    pub trophy_cache: Arc<TtlCache<CachedTrophies>>,
}

impl AppState {
    pub fn new(
        kv: Arc<dyn KvStore>,
        provider: Arc<dyn SegmentProvider>,
        competition: CompetitionConfig,
        game: GameSettings,
        clock: Arc<dyn Clock>,
        stats_cache_ttl: Duration,
    ) -> Self {
        let rankings_ttl = Duration::minutes(i64::from(competition.settings.cache_ttl_minutes));

        Self {
            kv,
            provider,
            competition: Arc::new(competition),
            game: Arc::new(game),
            rankings_cache: Arc::new(TtlCache::new(rankings_ttl, clock.clone())),
            trophy_cache: Arc::new(TtlCache::new(stats_cache_ttl, clock.clone())),
            clock,
        }
    }

    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let json = tokio::fs::read_to_string(&config.competition_config)
            .await
            .with_context(|| {
                format!(
                    "Failed to read competition config {}",
                    config.competition_config.display()
                )
            })?;
        let competition =
            CompetitionConfig::from_json(&json).context("Failed to parse competition config")?;
        tracing::info!(
            "Competition loaded: {} segments, {} - {}",
            competition.segments.len(),
            competition.settings.date_range.start,
            competition.settings.date_range.end
        );

        let kv: Arc<dyn KvStore> = match (&config.kv_url, &config.kv_token) {
            (Some(url), Some(token)) => {
                tracing::info!("Using KV store at {}", url);
                Arc::new(RestKvStore::new(url, token).context("Failed to build KV client")?)
            }
            _ => {
                tracing::warn!("KV_REST_API_URL / KV_REST_API_TOKEN not set, using in-memory store");
                Arc::new(MemoryKvStore::new())
            }
        };

        let credentials = StravaCredentials::from_parts(
            config.strava_client_id.clone(),
            config.strava_client_secret.clone(),
        );
        if credentials.is_none() {
            tracing::warn!("Strava credentials not set, rankings are unavailable");
        }
        let provider = StravaClient::new(credentials).context("Failed to build Strava client")?;

        let game = GameSettings {
            roster: Roster::from_comma_separated(&config.game_roster),
            policy: VotePolicy::from_comma_separated(&config.barred_voters),
            boundary: DayBoundary::new(config.timezone),
            stats_window_days: config.stats_window_days,
        };
        if game.roster.is_empty() {
            tracing::warn!("GAME_ROSTER is empty, every vote will be rejected");
        }
        tracing::info!(
            "Game roster of {} participants, days in {}",
            game.roster.len(),
            game.boundary.timezone()
        );

        Ok(Self::new(
            kv,
            Arc::new(provider),
            competition,
            game,
            Arc::new(SystemClock),
            Duration::seconds(config.stats_cache_ttl_secs),
        ))
    }

    pub fn today(&self) -> GameDay {
        self.game.boundary.today(self.clock.as_ref())
    }
}
