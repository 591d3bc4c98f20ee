use axum::{
    Router,
    routing::{get, post},
};

use crate::modules::lessons::controller::{approve_lesson, create_lesson, get_lessons};
use crate::state::AppState;

/// Create/approve use the singular `/lesson` form; the per-participant
/// listings live on the teacher and student routers.
pub fn init_lessons_router() -> Router<AppState> {
    Router::new()
        .route("/lesson", post(create_lesson))
        .route("/lesson/{id}/approve", post(approve_lesson))
        .route("/lessons", get(get_lessons))
}
