use axum::{
    Json,
    extract::{Path, Query, State},
};
use storage::{
    dto::game::{MyVoteResponse, StatsResponse, VoteRequest, VoteResponse, VoterQuery, VotersResponse},
    models::{GameMode, VoteOutcome},
};
use validator::Validate;

use crate::error::WebError;
use crate::state::AppState;

use super::services;

fn parse_mode(mode: &str) -> Result<GameMode, WebError> {
    mode.parse().map_err(WebError::BadRequest)
}

#[utoipa::path(
    post,
    path = "/api/game/{mode}/vote",
    params(
        ("mode" = String, Path, description = "hero, cloud or sleepy")
    ),
    request_body = VoteRequest,
    responses(
        (status = 200, description = "Vote recorded", body = VoteResponse),
        (status = 400, description = "Missing or unknown names, or a self-vote"),
        (status = 403, description = "Voter is barred"),
        (status = 409, description = "Voter already voted today")
    ),
    tag = "game"
)]
pub async fn cast_vote(
    State(state): State<AppState>,
    Path(mode): Path<String>,
    Json(req): Json<VoteRequest>,
) -> Result<Json<VoteResponse>, WebError> {
    let mode = parse_mode(&mode)?;
    req.validate()?;

    let outcome = services::cast_vote(
        &state,
        mode,
        req.from.as_deref(),
        req.target.as_deref(),
        state.today(),
    )
    .await?;

    match outcome {
        VoteOutcome::Accepted => Ok(Json(VoteResponse {
            success: true,
            message: format!(
                "{} voted for {} ({})",
                req.from.unwrap_or_default().trim(),
                req.target.unwrap_or_default().trim(),
                mode
            ),
        })),
        VoteOutcome::Rejected(reason) => Err(WebError::Rejected(reason)),
    }
}

#[utoipa::path(
    get,
    path = "/api/game/{mode}/my-vote",
    params(
        ("mode" = String, Path, description = "hero, cloud or sleepy"),
        VoterQuery
    ),
    responses(
        (status = 200, description = "Today's vote of the caller, if any", body = MyVoteResponse)
    ),
    tag = "game"
)]
pub async fn get_my_vote(
    State(state): State<AppState>,
    Path(mode): Path<String>,
    Query(query): Query<VoterQuery>,
) -> Result<Json<MyVoteResponse>, WebError> {
    let mode = parse_mode(&mode)?;
    let day = state.today();

    let voted_for = match query.from.as_deref().map(str::trim) {
        Some(from) if !from.is_empty() => services::my_vote(&state, mode, from, day).await?,
        _ => None,
    };

    Ok(Json(MyVoteResponse {
        date: day,
        voted_for,
    }))
}

#[utoipa::path(
    get,
    path = "/api/game/{mode}/voters",
    params(
        ("mode" = String, Path, description = "hero, cloud or sleepy")
    ),
    responses(
        (status = 200, description = "Who already voted today", body = VotersResponse)
    ),
    tag = "game"
)]
pub async fn get_voters(
    State(state): State<AppState>,
    Path(mode): Path<String>,
) -> Result<Json<VotersResponse>, WebError> {
    let mode = parse_mode(&mode)?;
    let day = state.today();

    let voters = services::voters(&state, mode, day).await?;

    Ok(Json(VotersResponse { date: day, voters }))
}

#[utoipa::path(
    get,
    path = "/api/game/stats",
    params(VoterQuery),
    responses(
        (status = 200, description = "Today's tallies of every mode with hero trophies and history", body = StatsResponse)
    ),
    tag = "game"
)]
pub async fn get_stats(
    State(state): State<AppState>,
    Query(query): Query<VoterQuery>,
) -> Result<Json<StatsResponse>, WebError> {
    let stats = services::stats(&state, query.from.as_deref(), state.today()).await?;

    Ok(Json(stats))
}
