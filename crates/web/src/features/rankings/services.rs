use std::sync::Arc;

use storage::{dto::ranking::Rankings, error::Result, services::ranking::current_rankings};

use crate::state::AppState;

/// Rankings from the cache, recomputed when stale
pub async fn get_rankings(state: &AppState) -> Result<Arc<Rankings>> {
    current_rankings(
        state.kv.as_ref(),
        state.provider.as_ref(),
        &state.competition,
        &state.rankings_cache,
        state.clock.as_ref(),
    )
    .await
}

/// Drops the cached rankings and recomputes them
pub async fn refresh_rankings(state: &AppState) -> Result<Arc<Rankings>> {
    state.rankings_cache.invalidate();
    tracing::info!("Rankings cache invalidated");
    get_rankings(state).await
}
