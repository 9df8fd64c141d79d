use anyhow::Context;
use utoipa::OpenApi;

mod config;
mod error;
mod features;
mod routes;
mod state;

use config::Config;
use features::{game, participants, rankings};
use state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        rankings::handlers::get_rankings,
        rankings::handlers::get_category_ranking,
        rankings::handlers::refresh_rankings,
        participants::handlers::list_participants,
        participants::handlers::list_segments,
        game::handlers::cast_vote,
        game::handlers::get_my_vote,
        game::handlers::get_voters,
        game::handlers::get_stats,
    ),
    components(
        schemas(
            storage::dto::ranking::RankingEntry,
            storage::dto::ranking::Rankings,
            storage::dto::ranking::CategoryRankingResponse,
            storage::dto::participant::ParticipantSummary,
            storage::dto::game::VoteRequest,
            storage::dto::game::VoteResponse,
            storage::dto::game::MyVoteResponse,
            storage::dto::game::VotersResponse,
            storage::dto::game::HistoryEntry,
            storage::dto::game::ModeStats,
            storage::dto::game::HeroStats,
            storage::dto::game::StatsResponse,
            storage::models::Category,
            storage::models::Segment,
            storage::models::GameMode,
            storage::models::VoteRejection,
            storage::GameDay,
        )
    ),
    tags(
        (name = "rankings", description = "Segment rankings computed from Strava efforts"),
        (name = "participants", description = "Competition participants and segments"),
        (name = "game", description = "Daily hero, cloud and sleepy votes"),
    )
)]
pub struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting Beton API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    let state = AppState::from_config(&config)
        .await
        .context("Failed to initialize application state")?;

    let bind_address = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    axum::serve(listener, routes::app(state, ApiDoc::openapi()))
        .await
        .context("Server error")?;

    Ok(())
}
