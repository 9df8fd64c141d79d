use std::sync::Arc;

use crate::cache::TtlCache;
use crate::day::GameDay;
use crate::dto::game::{HistoryEntry, TrophySummary};
use crate::error::Result;
use crate::kv::KvStore;
use crate::models::{GameMode, Roster};
use crate::repository::vote::VoteRepository;

/// Trailing window scanned for trophies when none is configured.
pub const DEFAULT_WINDOW_DAYS: u32 = 15;

/// Re-derives trophies and winner history from raw day tallies.
///
/// Nothing is persisted: every call scans `window_days` days strictly before
/// `today`, one multi-get of the whole roster per day.
pub struct TrophyAggregator<'a> {
    kv: &'a dyn KvStore,
    roster: &'a Roster,
}

impl<'a> TrophyAggregator<'a> {
    pub fn new(kv: &'a dyn KvStore, roster: &'a Roster) -> Self {
        Self { kv, roster }
    }

    pub async fn compute(&self, mode: GameMode, today: GameDay, window_days: u32) -> Result<TrophySummary> {
        let repo = VoteRepository::new(self.kv);
        let names = self.roster.names();
        let mut summary = TrophySummary::default();

        for day in today.trailing(window_days) {
            let counts = repo.tallies(mode, day, names).await?;
            if let Some(entry) = day_winners(day, names, &counts) {
                for winner in &entry.winners {
                    *summary.trophies.entry(winner.clone()).or_insert(0) += 1;
                }
                summary.history.push(entry);
            }
        }

        tracing::debug!(
            "Scanned {} days of {} votes: {} days with winners",
            window_days,
            mode,
            summary.history.len()
        );

        Ok(summary)
    }
}

/// Every name with the day's maximal count wins; a day without votes has no entry.
pub fn day_winners(day: GameDay, names: &[String], counts: &[u64]) -> Option<HistoryEntry> {
    let best = counts.iter().copied().max().unwrap_or(0);
    if best == 0 {
        return None;
    }

    let winners: Vec<String> = names
        .iter()
        .zip(counts)
        .filter(|(_, count)| **count == best)
        .map(|(name, _)| name.clone())
        .collect();

    Some(HistoryEntry {
        date: day,
        winner: winners.join(", "),
        winners,
        votes: best,
        total_votes: counts.iter().sum(),
    })
}

/// Cached summary for one day, so a day rollover invalidates it.
pub struct CachedTrophies {
    pub day: GameDay,
    pub summary: TrophySummary,
}

/// Hero trophies through the shared stats cache.
pub async fn cached_trophies(
    aggregator: &TrophyAggregator<'_>,
    cache: &TtlCache<CachedTrophies>,
    mode: GameMode,
    today: GameDay,
    window_days: u32,
) -> Result<Arc<CachedTrophies>> {
    if let Some(cached) = cache.get().filter(|c| c.day == today) {
        tracing::debug!("Serving cached {} trophies for {}", mode, today);
        return Ok(cached);
    }

    let summary = aggregator.compute(mode, today, window_days).await?;
    Ok(cache.put(CachedTrophies {
        day: today,
        summary,
    }))
}
