use storage::{
    GameDay,
    dto::game::StatsResponse,
    error::Result,
    models::{GameMode, VoteOutcome},
    services::{ledger::VoteLedger, stats::game_stats},
};

use crate::state::AppState;

fn ledger(state: &AppState) -> VoteLedger<'_> {
    VoteLedger::new(
        state.kv.as_ref(),
        &state.game.roster,
        &state.game.policy,
        state.clock.as_ref(),
    )
}

pub async fn cast_vote(
    state: &AppState,
    mode: GameMode,
    voter: Option<&str>,
    target: Option<&str>,
    day: GameDay,
) -> Result<VoteOutcome> {
    ledger(state).cast_vote(mode, voter, target, day).await
}

pub async fn my_vote(state: &AppState, mode: GameMode, voter: &str, day: GameDay) -> Result<Option<String>> {
    ledger(state).my_vote(mode, voter, day).await
}

pub async fn voters(state: &AppState, mode: GameMode, day: GameDay) -> Result<Vec<String>> {
    ledger(state).voters(mode, day).await
}

pub async fn stats(state: &AppState, from: Option<&str>, day: GameDay) -> Result<StatsResponse> {
    game_stats(
        state.kv.as_ref(),
        &state.game.roster,
        &state.trophy_cache,
        day,
        from,
        state.game.stats_window_days,
    )
    .await
}
