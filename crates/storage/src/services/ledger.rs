use crate::clock::Clock;
use crate::day::GameDay;
use crate::dto::game::{DayRanking, RankedTally};
use crate::error::Result;
use crate::kv::KvStore;
use crate::models::{GameMode, Roster, VoteOutcome, VotePolicy, VoteRecord, VoteRejection};
use crate::repository::vote::VoteRepository;

/// Number of entries kept in a day ranking snapshot
pub const DAY_RANKING_SIZE: usize = 10;

/// One vote per voter per day per game mode.
pub struct VoteLedger<'a> {
    kv: &'a dyn KvStore,
    roster: &'a Roster,
    policy: &'a VotePolicy,
    clock: &'a dyn Clock,
}

impl<'a> VoteLedger<'a> {
    pub fn new(
        kv: &'a dyn KvStore,
        roster: &'a Roster,
        policy: &'a VotePolicy,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            kv,
            roster,
            policy,
            clock,
        }
    }

    fn repo(&self) -> VoteRepository<'a> {
        VoteRepository::new(self.kv)
    }

    fn validate<'v>(
        &self,
        voter: Option<&'v str>,
        target: Option<&'v str>,
    ) -> std::result::Result<(&'v str, &'v str), VoteRejection> {
        let (Some(voter), Some(target)) = (present(voter), present(target)) else {
            return Err(VoteRejection::MissingFields);
        };

        for name in [voter, target] {
            if !self.roster.contains(name) {
                return Err(VoteRejection::UnknownParticipant {
                    name: name.to_string(),
                });
            }
        }
        if self.policy.is_barred(voter) {
            return Err(VoteRejection::Barred {
                voter: voter.to_string(),
            });
        }
        if voter == target {
            return Err(VoteRejection::SelfVote);
        }

        Ok((voter, target))
    }

    /// Validates and records a vote.
    ///
    /// Admission is a single create-if-absent write of the vote key, so two
    /// concurrent submissions from one voter cannot both be accepted. Store
    /// failures before the tally is incremented are returned with the vote
    /// key rolled back; follow-up bookkeeping failures are only logged.
    pub async fn cast_vote(
        &self,
        mode: GameMode,
        voter: Option<&str>,
        target: Option<&str>,
        day: GameDay,
    ) -> Result<VoteOutcome> {
        let (voter, target) = match self.validate(voter, target) {
            Ok(names) => names,
            Err(rejection) => return Ok(VoteOutcome::Rejected(rejection)),
        };
        let repo = self.repo();

        if !repo.try_record(mode, voter, target, day).await? {
            let voted_for = repo.find_vote(mode, voter, day).await?.unwrap_or_default();
            return Ok(VoteOutcome::Rejected(VoteRejection::AlreadyVoted { voted_for }));
        }

        if let Err(e) = repo.increment_tally(mode, day, target).await {
            if let Err(rollback) = repo.revoke(mode, voter, day).await {
                tracing::error!(
                    "Could not roll back {} vote of {} on {}: {}",
                    mode,
                    voter,
                    day,
                    rollback
                );
            }
            return Err(e);
        }

        if let Err(e) = repo.add_voter(mode, day, voter).await {
            tracing::warn!("Failed to add {} to {} voters of {}: {}", voter, mode, day, e);
        }

        let record = VoteRecord {
            voter: voter.to_string(),
            target: target.to_string(),
            at: self.clock.now(),
        };
        if let Err(e) = repo.append_journal(mode, day, &record).await {
            tracing::warn!("Failed to journal {} vote of {}: {}", mode, voter, e);
        }

        if let Err(e) = self.refresh_day_ranking(mode, day).await {
            tracing::warn!("Failed to refresh {} ranking for {}: {}", mode, day, e);
        }

        tracing::info!("{} voted {} for {} on {}", voter, mode, target, day);
        Ok(VoteOutcome::Accepted)
    }

    /// The voter's choice for the day; unknown voters simply have none.
    pub async fn my_vote(&self, mode: GameMode, voter: &str, day: GameDay) -> Result<Option<String>> {
        if !self.roster.contains(voter) {
            return Ok(None);
        }
        self.repo().find_vote(mode, voter, day).await
    }

    pub async fn voters(&self, mode: GameMode, day: GameDay) -> Result<Vec<String>> {
        self.repo().voters(mode, day).await
    }

    /// The stored day ranking snapshot
    pub async fn day_ranking(&self, mode: GameMode, day: GameDay) -> Result<DayRanking> {
        self.repo().day_ranking(mode, day).await
    }

    /// Rebuilds the day ranking from raw tallies and stores it.
    pub async fn refresh_day_ranking(&self, mode: GameMode, day: GameDay) -> Result<DayRanking> {
        let repo = self.repo();
        let names = self.roster.names();
        let counts = repo.tallies(mode, day, names).await?;

        let ranking = rank_tallies(names, &counts);
        repo.save_day_ranking(mode, day, &ranking).await?;

        Ok(ranking)
    }
}

fn present(name: Option<&str>) -> Option<&str> {
    name.filter(|n| !n.trim().is_empty())
}

/// Names with a positive count, by count descending, ties in input order,
/// cut to [`DAY_RANKING_SIZE`].
pub fn rank_tallies(names: &[String], counts: &[u64]) -> DayRanking {
    let mut ranking: DayRanking = names
        .iter()
        .zip(counts)
        .filter(|(_, count)| **count > 0)
        .map(|(name, count)| RankedTally(name.clone(), *count))
        .collect();

    ranking.sort_by(|a, b| b.1.cmp(&a.1));
    ranking.truncate(DAY_RANKING_SIZE);
    ranking
}
