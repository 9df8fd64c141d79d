use axum::{
    Json,
    extract::{Path, State},
};
use storage::{
    dto::ranking::{CategoryRankingResponse, Rankings},
    models::Category,
};

use crate::error::WebError;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    get,
    path = "/api/rankings",
    responses(
        (status = 200, description = "Rankings of every category", body = Rankings),
        (status = 500, description = "Strava credentials missing or store unavailable")
    ),
    tag = "rankings"
)]
pub async fn get_rankings(State(state): State<AppState>) -> Result<Json<Rankings>, WebError> {
    let rankings = services::get_rankings(&state).await?;

    Ok(Json(rankings.as_ref().clone()))
}

#[utoipa::path(
    get,
    path = "/api/rankings/{category}",
    params(
        ("category" = String, Path, description = "general, climb or sprint")
    ),
    responses(
        (status = 200, description = "Ranking of one category", body = CategoryRankingResponse),
        (status = 400, description = "Unknown category")
    ),
    tag = "rankings"
)]
pub async fn get_category_ranking(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<CategoryRankingResponse>, WebError> {
    let category: Category = category.parse().map_err(WebError::BadRequest)?;
    let rankings = services::get_rankings(&state).await?;

    Ok(Json(CategoryRankingResponse {
        category,
        entries: rankings.category(category).to_vec(),
        updated_at: rankings.updated_at,
    }))
}

#[utoipa::path(
    post,
    path = "/api/rankings/refresh",
    responses(
        (status = 200, description = "Freshly computed rankings", body = Rankings),
        (status = 500, description = "Strava credentials missing or store unavailable")
    ),
    tag = "rankings"
)]
pub async fn refresh_rankings(State(state): State<AppState>) -> Result<Json<Rankings>, WebError> {
    let rankings = services::refresh_rankings(&state).await?;

    Ok(Json(rankings.as_ref().clone()))
}
