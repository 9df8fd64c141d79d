use axum::{
    Router,
    routing::{get, post},
};

use super::handlers::{cast_vote, get_my_vote, get_stats, get_voters};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(get_stats))
        .route("/:mode/vote", post(cast_vote))
        .route("/:mode/my-vote", get(get_my_vote))
        .route("/:mode/voters", get(get_voters))
}
