use async_trait::async_trait;
use thiserror::Error;

use crate::models::{DateWindow, Effort};

/// Failure talking to the activity provider. Ranking computation treats it
/// as local to one participant or segment and carries on.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider rejected the credentials")]
    Unauthorized,

    #[error("Provider answered with status {0}")]
    Status(u16),

    #[error("Provider unreachable: {0}")]
    Transport(String),
}

/// Source of segment efforts (Strava in production).
#[async_trait]
pub trait SegmentProvider: Send + Sync {
    /// Whether the application credentials needed to talk to the provider are present.
    fn is_configured(&self) -> bool {
        true
    }

    /// Exchanges a long-lived refresh token for a short-lived access token.
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<String, ProviderError>;

    /// Every effort of `athlete_id` on `segment_id` inside `window`.
    async fn segment_efforts(
        &self,
        access_token: &str,
        segment_id: u64,
        athlete_id: u64,
        window: &DateWindow,
    ) -> Result<Vec<Effort>, ProviderError>;
}
