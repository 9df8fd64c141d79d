use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono_tz::Tz;
use storage::services::trophies::DEFAULT_WINDOW_DAYS;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub kv_url: Option<String>,
    pub kv_token: Option<String>,
    pub strava_client_id: Option<String>,
    pub strava_client_secret: Option<String>,
    pub competition_config: PathBuf,
    pub game_roster: String,
    pub barred_voters: String,
    pub timezone: Tz,
    pub stats_window_days: u32,
    pub stats_cache_ttl_secs: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: std::env::var("HOST").context("Cannot load HOST env variable")?,
            port: std::env::var("PORT")
                .context("Cannot load PORT env variable")?
                .parse()
                .context("PORT must be a number")?,
            kv_url: optional("KV_REST_API_URL"),
            kv_token: optional("KV_REST_API_TOKEN"),
            strava_client_id: optional("STRAVA_CLIENT_ID"),
            strava_client_secret: optional("STRAVA_CLIENT_SECRET"),
            competition_config: optional("COMPETITION_CONFIG")
                .unwrap_or_else(|| "config.public.json".to_string())
                .into(),
            game_roster: std::env::var("GAME_ROSTER").unwrap_or_default(),
            barred_voters: std::env::var("BARRED_VOTERS").unwrap_or_default(),
            timezone: match optional("GAME_TIMEZONE") {
                Some(tz) => tz
                    .parse()
                    .map_err(|e| anyhow::anyhow!("GAME_TIMEZONE is not a valid timezone: {}", e))?,
                None => chrono_tz::Europe::Madrid,
            },
            stats_window_days: parse_or("STATS_WINDOW_DAYS", DEFAULT_WINDOW_DAYS)?,
            stats_cache_ttl_secs: parse_or("STATS_CACHE_TTL_SECS", 300)?,
        })
    }
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional(name) {
        Some(value) => value
            .parse()
            .with_context(|| format!("{} must be a number", name)),
        None => Ok(default),
    }
}
