use axum::{
    Router,
    routing::{get, post},
};

use crate::modules::lessons::controller::get_teacher_lessons;
use crate::modules::teachers::controller::{
    create_teacher, delete_teacher, get_teacher, get_teacher_students, get_teachers,
    update_teacher,
};
use crate::state::AppState;

pub fn init_teachers_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_teacher).get(get_teachers))
        .route(
            "/{id}",
            get(get_teacher)
                .post(update_teacher)
                .patch(update_teacher)
                .delete(delete_teacher),
        )
        .route("/{id}/students", get(get_teacher_students))
        .route("/{id}/lessons", get(get_teacher_lessons))
}
