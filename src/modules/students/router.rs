use axum::{
    Router,
    routing::{get, post},
};

use crate::modules::lessons::controller::get_student_lessons;
use crate::modules::students::controller::{
    create_student, delete_student, get_student, get_students, update_student,
};
use crate::state::AppState;

pub fn init_students_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_student).get(get_students))
        .route(
            "/{id}",
            get(get_student).post(update_student).delete(delete_student),
        )
        .route("/{id}/lessons", get(get_student_lessons))
}
