use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::{Response, StatusCode};
use storage::models::{DateWindow, Effort};
use storage::{ProviderError, SegmentProvider};

use crate::error::{Result, StravaError};
use crate::models::{RefreshTokenRequest, SegmentEffortDto, TokenResponse};

const STRAVA_BASE_URL: &str = "https://www.strava.com";
const EFFORTS_PER_PAGE: u32 = 200;
const QUERY_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Application credentials of the Strava API app.
#[derive(Debug, Clone)]
pub struct StravaCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl StravaCredentials {
    /// Both values must be present and non-empty.
    pub fn from_parts(client_id: Option<String>, client_secret: Option<String>) -> Option<Self> {
        match (client_id, client_secret) {
            (Some(client_id), Some(client_secret))
                if !client_id.trim().is_empty() && !client_secret.trim().is_empty() =>
            {
                Some(Self {
                    client_id,
                    client_secret,
                })
            }
            _ => None,
        }
    }
}

pub struct StravaClient {
    base_url: String,
    client: reqwest::Client,
    credentials: Option<StravaCredentials>,
}

impl StravaClient {
    pub fn new(credentials: Option<StravaCredentials>) -> Result<Self> {
        Self::with_base_url(STRAVA_BASE_URL, credentials)
    }

    pub fn with_base_url(base_url: impl Into<String>, credentials: Option<StravaCredentials>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            credentials,
        })
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(StravaError::MissingCredentials)?;

        let url = format!("{}/oauth/token", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&RefreshTokenRequest {
                client_id: &credentials.client_id,
                client_secret: &credentials.client_secret,
                refresh_token,
                grant_type: "refresh_token",
            })
            .send()
            .await?;

        let body = check_status(response).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn fetch_segment_efforts(
        &self,
        access_token: &str,
        segment_id: u64,
        athlete_id: u64,
        window: &DateWindow,
    ) -> Result<Vec<SegmentEffortDto>> {
        let url = format!("{}/api/v3/segments/{}/all_efforts", self.base_url, segment_id);
        tracing::debug!("Fetching efforts of {} on segment {}", athlete_id, segment_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("athlete_id", athlete_id.to_string()),
                ("start_date_local", format_query_date(&window.start)),
                ("end_date_local", format_query_date(&window.end)),
                ("per_page", EFFORTS_PER_PAGE.to_string()),
            ])
            .send()
            .await?;

        let body = check_status(response).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

fn format_query_date(date: &NaiveDateTime) -> String {
    date.format(QUERY_DATE_FORMAT).to_string()
}

async fn check_status(response: Response) -> Result<Response> {
    match response.status() {
        status if status.is_success() => Ok(response),
        StatusCode::UNAUTHORIZED => Err(StravaError::Unauthorized),
        status => {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("Strava error body: {}", body);
            Err(StravaError::UnexpectedStatus(status.as_u16()))
        }
    }
}

#[async_trait]
impl SegmentProvider for StravaClient {
    fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> std::result::Result<String, ProviderError> {
        Ok(self.refresh_token(refresh_token).await?.access_token)
    }

    async fn segment_efforts(
        &self,
        access_token: &str,
        segment_id: u64,
        athlete_id: u64,
        window: &DateWindow,
    ) -> std::result::Result<Vec<Effort>, ProviderError> {
        let efforts = self
            .fetch_segment_efforts(access_token, segment_id, athlete_id, window)
            .await?;

        Ok(efforts.into_iter().map(Effort::from).collect())
    }
}
