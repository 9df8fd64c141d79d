use crate::cache::TtlCache;
use crate::day::GameDay;
use crate::dto::game::{HeroStats, ModeStats, StatsResponse};
use crate::error::Result;
use crate::kv::KvStore;
use crate::models::{GameMode, Roster};
use crate::repository::vote::VoteRepository;
use crate::services::trophies::{CachedTrophies, TrophyAggregator, cached_trophies};

/// Builds the combined game dashboard for one day.
///
/// Day rankings and the caller's own vote are always read from the store;
/// only the hero trophy scan goes through `trophy_cache`.
pub async fn game_stats(
    kv: &dyn KvStore,
    roster: &Roster,
    trophy_cache: &TtlCache<CachedTrophies>,
    today: GameDay,
    from: Option<&str>,
    window_days: u32,
) -> Result<StatsResponse> {
    let repo = VoteRepository::new(kv);

    let my_vote = match from.map(str::trim).filter(|name| roster.contains(name)) {
        Some(voter) => repo.find_vote(GameMode::Hero, voter, today).await?,
        None => None,
    };

    let aggregator = TrophyAggregator::new(kv, roster);
    let trophies = cached_trophies(&aggregator, trophy_cache, GameMode::Hero, today, window_days).await?;

    let hero = HeroStats {
        day: ModeStats::from_ranking(repo.day_ranking(GameMode::Hero, today).await?),
        my_vote,
        trophies: trophies.summary.trophies.clone(),
        history: trophies.summary.history.clone(),
    };

    Ok(StatsResponse {
        date: today,
        hero,
        cloud: ModeStats::from_ranking(repo.day_ranking(GameMode::Cloud, today).await?),
        sleepy: ModeStats::from_ranking(repo.day_ranking(GameMode::Sleepy, today).await?),
    })
}
