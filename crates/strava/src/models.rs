use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storage::models::Effort;

#[derive(Debug, Serialize)]
pub struct RefreshTokenRequest<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub refresh_token: &'a str,
    pub grant_type: &'static str,
}

/// Reply of the OAuth token endpoint. Strava may rotate the refresh token;
/// the registry keeps the one it has.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<i64>,
}

/// One entry of `GET /segments/{id}/all_efforts`, reduced to what ranking needs.
#[derive(Debug, Deserialize)]
pub struct SegmentEffortDto {
    pub id: u64,
    pub elapsed_time: u32,
    pub start_date: DateTime<Utc>,
}

impl From<SegmentEffortDto> for Effort {
    fn from(dto: SegmentEffortDto) -> Self {
        Effort::new(dto.id, dto.elapsed_time, dto.start_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_efforts_ignores_extra_fields() {
        let json = r#"[
            {
                "id": 3312345678,
                "resource_state": 2,
                "name": "Podjazd",
                "elapsed_time": 431,
                "moving_time": 425,
                "start_date": "2025-06-14T06:12:40Z",
                "start_date_local": "2025-06-14T08:12:40Z",
                "segment": {"id": 12345}
            }
        ]"#;

        let efforts: Vec<SegmentEffortDto> = serde_json::from_str(json).unwrap();
        let effort: Effort = efforts.into_iter().next().unwrap().into();

        assert_eq!(effort.effort_id, 3312345678);
        assert_eq!(effort.elapsed_time, 431);
        assert_eq!(effort.start_date.to_rfc3339(), "2025-06-14T06:12:40+00:00");
    }

    #[test]
    fn test_parse_token_response() {
        let json = r#"{"token_type": "Bearer", "access_token": "abc", "expires_at": 1750000000, "expires_in": 21600, "refresh_token": "def"}"#;

        let token: TokenResponse = serde_json::from_str(json).unwrap();

        assert_eq!(token.access_token, "abc");
        assert_eq!(token.refresh_token.as_deref(), Some("def"));
    }
}
