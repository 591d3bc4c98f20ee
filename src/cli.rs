//! CLI commands that run against the database without starting the server.

use sqlx::PgPool;

use crate::modules::users::model::{CreateUserDto, User, UserRole};
use crate::modules::users::service::UserService;
use crate::utils::errors::AppError;

/// Create an admin account. Admins are never created through the API.
pub async fn create_admin(
    pool: &PgPool,
    first_name: &str,
    last_name: &str,
    email: &str,
    password: &str,
) -> Result<User, AppError> {
    UserService::create_user(
        pool,
        CreateUserDto {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: UserRole::Admin,
        },
    )
    .await
}
