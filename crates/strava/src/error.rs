use storage::ProviderError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StravaError>;

#[derive(Error, Debug)]
pub enum StravaError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Failed to parse JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Strava rejected the token")]
    Unauthorized,

    #[error("Strava answered with status {0}")]
    UnexpectedStatus(u16),

    #[error("Strava application credentials are missing")]
    MissingCredentials,
}

impl From<StravaError> for ProviderError {
    fn from(error: StravaError) -> Self {
        match error {
            StravaError::Unauthorized | StravaError::MissingCredentials => ProviderError::Unauthorized,
            StravaError::UnexpectedStatus(status) => ProviderError::Status(status),
            StravaError::RequestError(e) => match e.status() {
                Some(status) => ProviderError::Status(status.as_u16()),
                None => ProviderError::Transport(e.to_string()),
            },
            StravaError::ParseError(e) => ProviderError::Transport(e.to_string()),
        }
    }
}
