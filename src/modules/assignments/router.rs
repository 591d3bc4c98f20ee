use axum::{
    Router,
    routing::{delete, post},
};

use crate::modules::assignments::controller::{create_assignment, delete_assignment};
use crate::state::AppState;

pub fn init_assignments_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_assignment))
        .route("/{id}", delete(delete_assignment))
}
