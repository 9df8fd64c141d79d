use crate::day::GameDay;
use crate::dto::game::DayRanking;
use crate::error::Result;
use crate::keys;
use crate::kv::{KvStore, parse_count};
use crate::models::{GameMode, VoteRecord};

/// Raw per-day vote state: vote keys, tallies, voter sets, journals and the
/// cached day ranking.
pub struct VoteRepository<'a> {
    kv: &'a dyn KvStore,
}

impl<'a> VoteRepository<'a> {
    pub fn new(kv: &'a dyn KvStore) -> Self {
        Self { kv }
    }

    /// Records the vote unless the voter already voted that day.
    /// Returns `false` when a vote key already exists.
    pub async fn try_record(
        &self,
        mode: GameMode,
        voter: &str,
        target: &str,
        day: GameDay,
    ) -> Result<bool> {
        self.kv
            .set_nx(&keys::vote(mode, voter, day), target, Some(keys::VOTE_TTL))
            .await
    }

    pub async fn revoke(&self, mode: GameMode, voter: &str, day: GameDay) -> Result<bool> {
        self.kv.del(&keys::vote(mode, voter, day)).await
    }

    pub async fn find_vote(&self, mode: GameMode, voter: &str, day: GameDay) -> Result<Option<String>> {
        self.kv.get(&keys::vote(mode, voter, day)).await
    }

    pub async fn increment_tally(&self, mode: GameMode, day: GameDay, target: &str) -> Result<i64> {
        self.kv.incr(&keys::tally(mode, day, target)).await
    }

    /// Tallies of every name for one day, in the given order
    pub async fn tallies(&self, mode: GameMode, day: GameDay, names: &[String]) -> Result<Vec<u64>> {
        let tally_keys: Vec<String> = names
            .iter()
            .map(|name| keys::tally(mode, day, name))
            .collect();

        Ok(self
            .kv
            .mget(&tally_keys)
            .await?
            .iter()
            .map(|raw| parse_count(raw.as_deref()))
            .collect())
    }

    pub async fn add_voter(&self, mode: GameMode, day: GameDay, voter: &str) -> Result<()> {
        let key = keys::voters(mode, day);
        if self.kv.sadd(&key, voter).await? {
            self.kv.expire(&key, keys::DAY_DATA_TTL).await?;
        }
        Ok(())
    }

    pub async fn voters(&self, mode: GameMode, day: GameDay) -> Result<Vec<String>> {
        self.kv.smembers(&keys::voters(mode, day)).await
    }

    pub async fn append_journal(&self, mode: GameMode, day: GameDay, record: &VoteRecord) -> Result<()> {
        let key = keys::journal(mode, day);
        let line = serde_json::to_string(record)?;
        if self.kv.rpush(&key, &line).await? == 1 {
            self.kv.expire(&key, keys::DAY_DATA_TTL).await?;
        }
        Ok(())
    }

    pub async fn save_day_ranking(&self, mode: GameMode, day: GameDay, ranking: &DayRanking) -> Result<()> {
        let json = serde_json::to_string(ranking)?;
        self.kv
            .set(&keys::day_ranking(mode, day), &json, Some(keys::DAY_DATA_TTL))
            .await
    }

    /// The cached day ranking; an absent or unreadable snapshot reads as empty.
    pub async fn day_ranking(&self, mode: GameMode, day: GameDay) -> Result<DayRanking> {
        let Some(json) = self.kv.get(&keys::day_ranking(mode, day)).await? else {
            return Ok(DayRanking::new());
        };

        Ok(serde_json::from_str(&json).unwrap_or_else(|e| {
            tracing::warn!("Discarding malformed {} ranking for {}: {}", mode, day, e);
            DayRanking::new()
        }))
    }
}
