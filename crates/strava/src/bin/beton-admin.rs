use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};
use storage::{
    RestKvStore, SystemClock,
    clock::Clock,
    dto::{competition::CompetitionConfig, participant::ParticipantSummary},
    models::Participant,
    repository::participant::ParticipantRepository,
    services::ranking::{RankingAggregator, load_participants},
};
use strava::{StravaClient, StravaCredentials};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "beton-admin")]
#[command(about = "Participant registry and ranking tools for the segment competition", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "KV_REST_API_URL")]
    kv_url: String,

    #[arg(long, env = "KV_REST_API_TOKEN", hide_env_values = true)]
    kv_token: String,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    Participants {
        #[command(subcommand)]
        command: ParticipantCommands,
    },
    /// Computes the rankings once and prints them as JSON
    Rankings {
        #[arg(long, env = "COMPETITION_CONFIG", default_value = "config.public.json")]
        config: PathBuf,

        #[arg(long, env = "STRAVA_CLIENT_ID")]
        client_id: Option<String>,

        #[arg(long, env = "STRAVA_CLIENT_SECRET", hide_env_values = true)]
        client_secret: Option<String>,
    },
}

#[derive(Subcommand)]
enum ParticipantCommands {
    /// Registers or replaces a participant
    Add {
        #[arg(long)]
        strava_id: u64,

        #[arg(long)]
        name: String,

        /// Defaults to the name
        #[arg(long)]
        display_name: Option<String>,

        #[arg(long)]
        refresh_token: String,
    },
    List,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("beton_admin={},strava={},storage={}", log_level, log_level, log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let kv = RestKvStore::new(&cli.kv_url, &cli.kv_token)?;

    match cli.command {
        Commands::Participants { command } => handle_participants(&kv, command).await?,
        Commands::Rankings {
            config,
            client_id,
            client_secret,
        } => handle_rankings(&kv, config, client_id, client_secret).await?,
    }

    Ok(())
}

async fn handle_participants(
    kv: &RestKvStore,
    command: ParticipantCommands,
) -> Result<(), Box<dyn std::error::Error>> {
    let repo = ParticipantRepository::new(kv);

    match command {
        ParticipantCommands::Add {
            strava_id,
            name,
            display_name,
            refresh_token,
        } => {
            let display_name = display_name.unwrap_or_else(|| name.clone());
            let mut participant = Participant::new(strava_id, name, display_name, refresh_token);
            participant.added_at = Some(Utc::now());

            let replaced = repo.find(strava_id).await.is_ok();
            repo.save(&participant).await?;
            if replaced {
                tracing::info!("✓ Replaced {} ({})", participant.display_name, strava_id);
            } else {
                tracing::info!("✓ Registered {} ({})", participant.display_name, strava_id);
            }
        }
        ParticipantCommands::List => {
            let participants = repo.list().await?;
            for participant in &participants {
                let summary = ParticipantSummary::from(participant);
                println!("{}\t{}\t{}", summary.strava_id, participant.name, summary.name);
            }
            tracing::info!("{} participants registered", participants.len());
        }
    }

    Ok(())
}

async fn handle_rankings(
    kv: &RestKvStore,
    config: PathBuf,
    client_id: Option<String>,
    client_secret: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Loading competition from: {}", config.display());
    let json = tokio::fs::read_to_string(&config).await?;
    let competition = CompetitionConfig::from_json(&json)?;

    let client = StravaClient::new(StravaCredentials::from_parts(client_id, client_secret))?;
    let participants = load_participants(kv, &competition.participants).await;

    let rankings = RankingAggregator::new(
        &client,
        &competition.segments,
        &competition.settings.date_range,
    )
    .compute(&participants, SystemClock.now())
    .await?;

    println!("{}", serde_json::to_string_pretty(&rankings)?);
    Ok(())
}
