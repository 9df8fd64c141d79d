use axum::{
    Router,
    routing::{get, post},
};

use super::handlers::{get_category_ranking, get_rankings, refresh_rankings};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_rankings))
        .route("/refresh", post(refresh_rankings))
        .route("/:category", get(get_category_ranking))
}
