use axum::{Router, routing::get};

use super::handlers::{list_participants, list_segments};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/participants", get(list_participants))
        .route("/segments", get(list_segments))
}
