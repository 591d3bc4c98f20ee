use axum::{
    Router,
    routing::get,
};

use crate::modules::users::controller::{create_user, get_user, get_users};
use crate::state::AppState;

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_users).post(create_user))
        .route("/{id}", get(get_user))
}
