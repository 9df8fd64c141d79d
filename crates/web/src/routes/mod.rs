use std::time::Duration;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use utoipa_swagger_ui::SwaggerUi;

use crate::features::{game, participants, rankings};
use crate::state::AppState;

pub fn api() -> Router<AppState> {
    Router::new()
        .nest("/rankings", rankings::routes::routes())
        .nest("/game", game::routes::routes())
        .merge(participants::routes::routes())
}

pub fn app(state: AppState, openapi: utoipa::openapi::OpenApi) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .nest("/api", api())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use chrono::{NaiveDate, TimeZone, Utc};
    use serde_json::{Value, json};
    use storage::{
        DayBoundary, MemoryKvStore, ProviderError, SegmentProvider,
        clock::ManualClock,
        dto::competition::{CompetitionConfig, CompetitionSettings},
        models::{Category, DateWindow, Effort, Participant, Roster, Segment, VotePolicy},
        repository::participant::ParticipantRepository,
    };
    use tower::ServiceExt;
    use utoipa::OpenApi;

    use crate::ApiDoc;
    use crate::state::GameSettings;

    struct FixedProvider {
        configured: bool,
        times: HashMap<(u64, u64), u32>,
    }

    #[async_trait]
    impl SegmentProvider for FixedProvider {
        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn refresh_access_token(&self, refresh_token: &str) -> Result<String, ProviderError> {
            Ok(format!("access-{}", refresh_token))
        }

        async fn segment_efforts(
            &self,
            _access_token: &str,
            segment_id: u64,
            athlete_id: u64,
            _window: &DateWindow,
        ) -> Result<Vec<Effort>, ProviderError> {
            let start = Utc.with_ymd_and_hms(2025, 6, 10, 7, 0, 0).unwrap();
            Ok(self
                .times
                .get(&(athlete_id, segment_id))
                .map(|time| vec![Effort::new(segment_id * 100 + athlete_id, *time, start)])
                .unwrap_or_default())
        }
    }

    fn competition() -> CompetitionConfig {
        let day = |d| NaiveDate::from_ymd_opt(2025, 6, d).unwrap();
        CompetitionConfig {
            segments: vec![
                Segment::new(1, "Hill", Category::Climb),
                Segment::new(2, "Straight", Category::Sprint),
            ],
            settings: CompetitionSettings {
                date_range: DateWindow::new(
                    day(1).and_hms_opt(0, 0, 0).unwrap(),
                    day(30).and_hms_opt(23, 59, 59).unwrap(),
                ),
                cache_ttl_minutes: 15,
            },
            participants: Vec::new(),
        }
    }

    fn test_app(configured: bool) -> (Router, Arc<MemoryKvStore>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 6, 14, 10, 0, 0).unwrap(),
        ));
        let kv = Arc::new(MemoryKvStore::with_clock(clock.clone()));
        let provider = FixedProvider {
            configured,
            times: HashMap::from([((7, 1), 400), ((7, 2), 100), ((8, 1), 500)]),
        };
        let game = GameSettings {
            roster: Roster::from_comma_separated("Asia,Kuba,Olaf,Stefka"),
            policy: VotePolicy::from_comma_separated("Stefka"),
            boundary: DayBoundary::default(),
            stats_window_days: 15,
        };

        let state = AppState::new(
            kv.clone(),
            Arc::new(provider),
            competition(),
            game,
            clock,
            chrono::Duration::minutes(5),
        );

        (app(state, ApiDoc::openapi()), kv)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_vote_flow() {
        let (app, _) = test_app(true);

        let (status, body) = send(
            &app,
            post_json("/api/game/hero/vote", json!({"from": "Asia", "hero": "Kuba"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (status, body) = send(
            &app,
            post_json("/api/game/hero/vote", json!({"from": "Asia", "target": "Olaf"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["voted_for"], "Kuba");

        let (status, body) = send(&app, get("/api/game/hero/my-vote?from=Asia")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["date"], "2025-06-14");
        assert_eq!(body["voted_for"], "Kuba");

        let (_, body) = send(&app, get("/api/game/hero/voters")).await;
        assert_eq!(body["voters"], json!(["Asia"]));

        let (status, body) = send(&app, get("/api/game/stats?from=Asia")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["hero"]["today"]["Kuba"], 1);
        assert_eq!(body["hero"]["ranking"], json!([["Kuba", 1]]));
        assert_eq!(body["hero"]["my_vote"], "Kuba");
        assert_eq!(body["cloud"]["ranking"], json!([]));
    }

    #[tokio::test]
    async fn test_vote_rejections() {
        let (app, _) = test_app(true);

        let (status, _) = send(
            &app,
            post_json("/api/game/hero/vote", json!({"from": "Stefka", "target": "Kuba"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(
            &app,
            post_json("/api/game/sleepy/vote", json!({"from": "Olaf", "target": "Olaf"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["reason"], "self_vote");

        let (status, body) = send(
            &app,
            post_json("/api/game/cloud/vote", json!({"from": "Olaf"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["reason"], "missing_fields");

        let (status, body) = send(
            &app,
            post_json("/api/game/hero/vote", json!({"from": "x".repeat(80), "target": "Olaf"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Validation failed");

        let (status, _) = send(
            &app,
            post_json("/api/game/villain/vote", json!({"from": "Asia", "target": "Olaf"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_rankings_endpoints() {
        let (app, kv) = test_app(true);
        let registry = ParticipantRepository::new(kv.as_ref());
        registry
            .save(&Participant::new(7, "kuba", "Kuba", "rt-7"))
            .await
            .unwrap();
        registry
            .save(&Participant::new(8, "olaf", "Olaf", "rt-8"))
            .await
            .unwrap();

        let (status, body) = send(&app, get("/api/rankings")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["general"][0]["name"], "Kuba");
        assert_eq!(body["general"][0]["time"], 500);
        assert_eq!(body["general"][0]["points"], 12.5);
        assert_eq!(body["general"][1]["name"], "Olaf");
        assert_eq!(body["sprint"].as_array().unwrap().len(), 1);

        let (status, body) = send(&app, get("/api/rankings/gory")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["category"], "climb");
        assert_eq!(body["entries"].as_array().unwrap().len(), 2);

        let (status, _) = send(&app, get("/api/rankings/downhill")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, post_json("/api/rankings/refresh", json!({}))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rankings_without_credentials() {
        let (app, _) = test_app(false);

        let (status, body) = send(&app, get("/api/rankings")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("STRAVA_CLIENT_ID"));
    }

    #[tokio::test]
    async fn test_participants_hide_tokens() {
        let (app, kv) = test_app(true);
        ParticipantRepository::new(kv.as_ref())
            .save(&Participant::new(7, "kuba", "Kuba", "rt-7"))
            .await
            .unwrap();

        let (status, body) = send(&app, get("/api/participants")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([{"name": "Kuba", "strava_id": 7}]));

        let (_, body) = send(&app, get("/api/segments")).await;
        assert_eq!(body[0]["category"], "climb");
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let (app, _) = test_app(true);

        let (status, body) = send(&app, get("/api-docs/openapi.json")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/api/game/{mode}/vote"].is_object());
    }
}
