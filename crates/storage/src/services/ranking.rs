use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::cache::TtlCache;
use crate::clock::Clock;
use crate::dto::competition::CompetitionConfig;
use crate::dto::ranking::{RankingEntry, Rankings};
use crate::error::{Result, StorageError};
use crate::kv::KvStore;
use crate::models::{Category, DateWindow, Effort, Participant, Segment, best_effort};
use crate::provider::SegmentProvider;
use crate::repository::participant::ParticipantRepository;

/// Points awarded for a segment before the multiplier and time are applied.
pub const BASE_POINTS: i64 = 1000;

/// `BASE_POINTS * multiplier / elapsed_time`, rounded half-up to two decimals.
/// `None` for a zero elapsed time or when the result overflows.
pub fn effort_points(multiplier: Decimal, elapsed_time: u32) -> Option<Decimal> {
    if elapsed_time == 0 {
        return None;
    }

    let raw = Decimal::from(BASE_POINTS)
        .checked_mul(multiplier)?
        .checked_div(Decimal::from(elapsed_time))?;
    Some(raw.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

#[derive(Debug, Clone, Copy, Default)]
struct Totals {
    time: u64,
    points: Decimal,
    segments: u32,
}

impl Totals {
    fn add(&mut self, elapsed_time: u32, points: Decimal) {
        self.time += u64::from(elapsed_time);
        self.points += points;
        self.segments += 1;
    }
}

/// Turns segment efforts into per-category rankings.
pub struct RankingAggregator<'a> {
    provider: &'a dyn SegmentProvider,
    segments: &'a [Segment],
    window: &'a DateWindow,
}

impl<'a> RankingAggregator<'a> {
    pub fn new(
        provider: &'a dyn SegmentProvider,
        segments: &'a [Segment],
        window: &'a DateWindow,
    ) -> Self {
        Self {
            provider,
            segments,
            window,
        }
    }

    /// Computes every category ranking for `participants`.
    ///
    /// Participants whose token cannot be refreshed and segments that cannot be
    /// fetched are skipped; only missing provider credentials fail the batch.
    pub async fn compute(
        &self,
        participants: &[Participant],
        now: DateTime<Utc>,
    ) -> Result<Rankings> {
        if !self.provider.is_configured() {
            return Err(StorageError::Configuration(
                "Strava credentials are not set (STRAVA_CLIENT_ID / STRAVA_CLIENT_SECRET)".into(),
            ));
        }

        let mut rankings = Rankings::empty(now);
        if self.window.is_empty() {
            tracing::warn!(
                "Date window {} - {} is empty, nothing to rank",
                self.window.start,
                self.window.end
            );
            return Ok(rankings);
        }

        for participant in participants {
            let Some(totals) = self.participant_totals(participant).await else {
                continue;
            };

            for category in Category::ALL {
                let Some(total) = totals.get(&category).filter(|t| t.segments > 0) else {
                    continue;
                };
                rankings.category_mut(category).push(RankingEntry {
                    rank: 0,
                    name: participant.display_name.clone(),
                    strava_id: participant.strava_id,
                    time: total.time,
                    points: total.points,
                    segments_count: total.segments,
                });
            }
        }

        for category in Category::ALL {
            assign_ranks(rankings.category_mut(category));
        }

        tracing::info!(
            "Computed rankings for {} participants ({} ranked overall)",
            participants.len(),
            rankings.general.len()
        );

        Ok(rankings)
    }

    async fn participant_totals(&self, participant: &Participant) -> Option<HashMap<Category, Totals>> {
        let access_token = match self
            .provider
            .refresh_access_token(&participant.refresh_token)
            .await
        {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(
                    "Skipping {} ({}): token refresh failed: {}",
                    participant.display_name,
                    participant.strava_id,
                    e
                );
                return None;
            }
        };

        let mut totals: HashMap<Category, Totals> = HashMap::new();

        for segment in self.segments {
            let efforts = match self
                .provider
                .segment_efforts(&access_token, segment.id, participant.strava_id, self.window)
                .await
            {
                Ok(efforts) => efforts,
                Err(e) => {
                    tracing::warn!(
                        "Segment {} fetch failed for {}: {}",
                        segment.id,
                        participant.strava_id,
                        e
                    );
                    continue;
                }
            };

            let (efforts, zero_time): (Vec<Effort>, Vec<Effort>) =
                efforts.into_iter().partition(|e| e.elapsed_time > 0);
            for effort in &zero_time {
                tracing::warn!("Ignoring zero-time effort {} on segment {}", effort.effort_id, segment.id);
            }

            let Some(best) = best_effort(&efforts) else {
                continue;
            };
            let Some(points) = effort_points(segment.multiplier, best.elapsed_time) else {
                tracing::warn!(
                    "Points for effort {} on segment {} are out of range",
                    best.effort_id,
                    segment.id
                );
                continue;
            };

            totals
                .entry(Category::General)
                .or_default()
                .add(best.elapsed_time, points);
            if segment.category != Category::General {
                totals
                    .entry(segment.category)
                    .or_default()
                    .add(best.elapsed_time, points);
            }
        }

        Some(totals)
    }
}

/// Stable ascending sort by total time; ties keep participant order.
fn assign_ranks(entries: &mut [RankingEntry]) {
    entries.sort_by_key(|entry| entry.time);
    for (index, entry) in entries.iter_mut().enumerate() {
        entry.rank = index as u32 + 1;
    }
}

/// Registered participants, or the competition file's list when the
/// registry cannot be read.
pub async fn load_participants(kv: &dyn KvStore, fallback: &[Participant]) -> Vec<Participant> {
    match ParticipantRepository::new(kv).list().await {
        Ok(participants) => {
            tracing::info!("Loaded {} participants from the registry", participants.len());
            participants
        }
        Err(e) => {
            tracing::error!("Registry read failed, using {} configured participants: {}", fallback.len(), e);
            let mut participants = fallback.to_vec();
            participants.sort_by_key(|p| p.strava_id);
            participants
        }
    }
}

/// Rankings through the process-wide cache; recomputed only when stale.
pub async fn current_rankings(
    kv: &dyn KvStore,
    provider: &dyn SegmentProvider,
    competition: &CompetitionConfig,
    cache: &TtlCache<Rankings>,
    clock: &dyn Clock,
) -> Result<Arc<Rankings>> {
    cache
        .get_or_try_refresh(|| async {
            let participants = load_participants(kv, &competition.participants).await;
            RankingAggregator::new(
                provider,
                &competition.segments,
                &competition.settings.date_range,
            )
            .compute(&participants, clock.now())
            .await
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::dto::competition::CompetitionSettings;
    use crate::kv::MemoryKvStore;
    use crate::provider::ProviderError;
    use async_trait::async_trait;
    use chrono::{Duration, NaiveDate, TimeZone};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct StubProvider {
        efforts: HashMap<(u64, u64), Vec<u32>>,
        bad_tokens: HashSet<String>,
        broken_segments: HashSet<u64>,
        unconfigured: bool,
        calls: AtomicUsize,
    }

    impl StubProvider {
        fn with_efforts(mut self, athlete: u64, segment: u64, times: &[u32]) -> Self {
            self.efforts
                .entry((athlete, segment))
                .or_default()
                .extend_from_slice(times);
            self
        }
    }

    #[async_trait]
    impl SegmentProvider for StubProvider {
        fn is_configured(&self) -> bool {
            !self.unconfigured
        }

        async fn refresh_access_token(
            &self,
            refresh_token: &str,
        ) -> std::result::Result<String, ProviderError> {
            if self.bad_tokens.contains(refresh_token) {
                return Err(ProviderError::Unauthorized);
            }
            Ok(format!("access-{}", refresh_token))
        }

        async fn segment_efforts(
            &self,
            _access_token: &str,
            segment_id: u64,
            athlete_id: u64,
            _window: &DateWindow,
        ) -> std::result::Result<Vec<Effort>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.broken_segments.contains(&segment_id) {
                return Err(ProviderError::Status(500));
            }
            let start = Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap();
            Ok(self
                .efforts
                .get(&(athlete_id, segment_id))
                .map(|times| {
                    times
                        .iter()
                        .enumerate()
                        .map(|(i, t)| Effort::new(i as u64 + 1, *t, start))
                        .collect()
                })
                .unwrap_or_default())
        }
    }

    fn window() -> DateWindow {
        let day = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        DateWindow::new(
            day.and_hms_opt(0, 0, 0).unwrap(),
            day.and_hms_opt(0, 0, 0).unwrap() + Duration::days(30),
        )
    }

    fn segments() -> Vec<Segment> {
        vec![
            Segment::new(1, "Climb A", Category::Climb),
            Segment::new(2, "Sprint B", Category::Sprint),
            Segment::new(3, "Loop C", Category::General).with_multiplier(Decimal::new(15, 1)),
        ]
    }

    fn participants() -> Vec<Participant> {
        vec![
            Participant::new(10, "Asia K", "Asia", "rt-asia"),
            Participant::new(20, "Kuba N", "Kuba", "rt-kuba"),
            Participant::new(30, "Olaf W", "Olaf", "rt-olaf"),
        ]
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 20, 12, 0, 0).unwrap()
    }

    async fn compute(provider: &StubProvider, participants: &[Participant]) -> Rankings {
        let segments = segments();
        let window = window();
        RankingAggregator::new(provider, &segments, &window)
            .compute(participants, now())
            .await
            .unwrap()
    }

    #[test]
    fn test_points_formula() {
        assert_eq!(effort_points(Decimal::ONE, 200), Some(Decimal::new(500, 2)));
        // 1000 * 1.5 / 7 = 214.2857.. -> 214.29
        assert_eq!(effort_points(Decimal::new(15, 1), 7), Some(Decimal::new(21429, 2)));
        // 1000 / 80000 = 0.0125 -> 0.01
        assert_eq!(effort_points(Decimal::ONE, 80_000), Some(Decimal::new(1, 2)));
        assert_eq!(effort_points(Decimal::ONE, 0), None);
    }

    #[test]
    fn test_points_round_half_up() {
        assert_eq!(effort_points(Decimal::ONE, 400), Some(Decimal::new(250, 2)));
        // 1000 * 0.001 / 8 = 0.125 -> 0.13 (half-up, not half-even)
        assert_eq!(effort_points(Decimal::new(1, 3), 8), Some(Decimal::new(13, 2)));
    }

    #[tokio::test]
    async fn test_totals_per_category() {
        let provider = StubProvider::default()
            .with_efforts(10, 1, &[300, 250])
            .with_efforts(10, 2, &[40])
            .with_efforts(10, 3, &[500])
            .with_efforts(20, 1, &[200]);

        let rankings = compute(&provider, &participants()).await;

        let asia = &rankings.general[1];
        assert_eq!(asia.name, "Asia");
        assert_eq!(asia.time, 250 + 40 + 500);
        assert_eq!(asia.segments_count, 3);
        // 4.00 + 25.00 + 3.00
        assert_eq!(asia.points, Decimal::new(3200, 2));

        assert_eq!(rankings.climb.len(), 2);
        assert_eq!(rankings.climb[0].name, "Kuba");
        assert_eq!(rankings.climb[0].rank, 1);
        assert_eq!(rankings.climb[1].time, 250);

        assert_eq!(rankings.sprint.len(), 1);
        assert_eq!(rankings.sprint[0].segments_count, 1);
    }

    #[tokio::test]
    async fn test_slower_duplicate_effort_changes_nothing() {
        let base = StubProvider::default()
            .with_efforts(10, 1, &[250])
            .with_efforts(20, 1, &[260]);
        let with_duplicate = StubProvider::default()
            .with_efforts(10, 1, &[250, 400, 251])
            .with_efforts(20, 1, &[260, 999]);

        let before = compute(&base, &participants()).await;
        let after = compute(&with_duplicate, &participants()).await;

        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_rankings_sorted_and_absentees_excluded() {
        let provider = StubProvider::default()
            .with_efforts(10, 1, &[300])
            .with_efforts(20, 1, &[120])
            .with_efforts(30, 2, &[30]);

        let rankings = compute(&provider, &participants()).await;

        for category in Category::ALL {
            let times: Vec<u64> = rankings.category(category).iter().map(|e| e.time).collect();
            assert!(times.windows(2).all(|w| w[0] <= w[1]), "{category} not sorted");
        }
        assert!(rankings.climb.iter().all(|e| e.name != "Olaf"));
        assert!(rankings.sprint.iter().all(|e| e.name != "Asia"));
        assert_eq!(rankings.general.len(), 3);
    }

    #[tokio::test]
    async fn test_ties_keep_participant_order() {
        let provider = StubProvider::default()
            .with_efforts(10, 1, &[100])
            .with_efforts(20, 1, &[100])
            .with_efforts(30, 1, &[90]);

        let rankings = compute(&provider, &participants()).await;
        let names: Vec<&str> = rankings.climb.iter().map(|e| e.name.as_str()).collect();

        assert_eq!(names, vec!["Olaf", "Asia", "Kuba"]);
    }

    #[tokio::test]
    async fn test_empty_inputs_yield_empty_rankings() {
        let provider = StubProvider::default().with_efforts(10, 1, &[100]);

        let no_participants = compute(&provider, &[]).await;
        assert!(Category::ALL.iter().all(|c| no_participants.category(*c).is_empty()));

        let empty_window = DateWindow::new(window().end, window().start);
        let segments = segments();
        let rankings = RankingAggregator::new(&provider, &segments, &empty_window)
            .compute(&participants(), now())
            .await
            .unwrap();
        assert!(Category::ALL.iter().all(|c| rankings.category(*c).is_empty()));
    }

    #[tokio::test]
    async fn test_failures_skip_participant_or_segment() {
        let mut provider = StubProvider::default()
            .with_efforts(10, 1, &[100])
            .with_efforts(10, 2, &[50])
            .with_efforts(20, 1, &[90]);
        provider.bad_tokens.insert("rt-kuba".to_string());
        provider.broken_segments.insert(2);

        let rankings = compute(&provider, &participants()).await;

        assert_eq!(rankings.general.len(), 1);
        assert_eq!(rankings.general[0].name, "Asia");
        assert_eq!(rankings.general[0].time, 100);
        assert!(rankings.sprint.is_empty());
    }

    #[test]
    fn test_points_overflow_is_none() {
        assert_eq!(effort_points(Decimal::MAX, 1), None);
    }

    #[tokio::test]
    async fn test_zero_time_effort_is_ignored() {
        let provider = StubProvider::default().with_efforts(10, 2, &[0]);

        let rankings = compute(&provider, &participants()).await;
        assert!(rankings.general.is_empty());
    }

    #[tokio::test]
    async fn test_zero_time_effort_keeps_valid_efforts() {
        let provider = StubProvider::default().with_efforts(10, 1, &[300, 0]);

        let rankings = compute(&provider, &participants()).await;

        assert_eq!(rankings.general.len(), 1);
        assert_eq!(rankings.general[0].time, 300);
        // 1000 / 300 = 3.333.. -> 3.33
        assert_eq!(rankings.general[0].points, Decimal::new(333, 2));
        assert_eq!(rankings.climb.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_the_request() {
        let provider = StubProvider {
            unconfigured: true,
            ..Default::default()
        };
        let segments = segments();
        let window = window();

        let result = RankingAggregator::new(&provider, &segments, &window)
            .compute(&participants(), now())
            .await;
        assert!(matches!(result, Err(StorageError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_cached_rankings_are_reused() {
        let kv = MemoryKvStore::new();
        let repo = ParticipantRepository::new(&kv);
        for participant in participants() {
            repo.save(&participant).await.unwrap();
        }

        let provider = StubProvider::default().with_efforts(10, 1, &[100]);
        let competition = CompetitionConfig {
            segments: segments(),
            settings: CompetitionSettings {
                date_range: window(),
                cache_ttl_minutes: 15,
            },
            participants: Vec::new(),
        };
        let clock = Arc::new(ManualClock::new(now()));
        let cache = TtlCache::new(Duration::minutes(15), clock.clone());

        let first = current_rankings(&kv, &provider, &competition, &cache, clock.as_ref())
            .await
            .unwrap();
        let calls_after_first = provider.calls.load(Ordering::SeqCst);
        assert_eq!(calls_after_first, 9);

        clock.advance(Duration::minutes(5));
        let second = current_rankings(&kv, &provider, &competition, &cache, clock.as_ref())
            .await
            .unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), calls_after_first);
        assert_eq!(first, second);

        clock.advance(Duration::minutes(11));
        current_rankings(&kv, &provider, &competition, &cache, clock.as_ref())
            .await
            .unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), calls_after_first * 2);
    }

    #[tokio::test]
    async fn test_registry_failure_falls_back_to_configured_participants() {
        let kv = MemoryKvStore::new();
        // a string where the id set should be makes SMEMBERS fail
        kv.set(crate::keys::PARTICIPANT_IDS, "oops", None).await.unwrap();

        let fallback = vec![Participant::new(5, "Zuza", "Zuza", "rt"), Participant::new(2, "Ola", "Ola", "rt")];
        let loaded = load_participants(&kv, &fallback).await;

        let ids: Vec<u64> = loaded.iter().map(|p| p.strava_id).collect();
        assert_eq!(ids, vec![2, 5]);
    }
}
