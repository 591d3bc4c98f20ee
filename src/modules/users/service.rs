use anyhow::Context;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::users::model::{CreateUserDto, User};
use crate::utils::errors::AppError;
use crate::utils::password::hash_password;

const USER_COLUMNS: &str = "id, first_name, last_name, email, role, created_at, updated_at";

pub struct UserService;

impl UserService {
    #[instrument(skip(db, dto))]
    pub async fn create_user(db: &PgPool, dto: CreateUserDto) -> Result<User, AppError> {
        if Self::email_taken(db, &dto.email, None).await? {
            return Err(AppError::conflict(anyhow::anyhow!(
                "User with this email already exists"
            )));
        }

        let hashed_password = hash_password(&dto.password)?;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (first_name, last_name, email, password, role)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&dto.email)
        .bind(&hashed_password)
        .bind(dto.role)
        .fetch_one(db)
        .await
        .map_err(map_unique_violation)?;

        Ok(user)
    }

    #[instrument(skip(db))]
    pub async fn get_users(db: &PgPool) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY last_name, first_name"
        ))
        .fetch_all(db)
        .await
        .context("Failed to fetch users")
        .map_err(AppError::database)?;

        Ok(users)
    }

    #[instrument(skip(db))]
    pub async fn get_user(db: &PgPool, id: Uuid) -> Result<User, AppError> {
        let user =
            sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(db)
                .await
                .context("Failed to fetch user by ID")
                .map_err(AppError::database)?
                .ok_or_else(|| {
                    AppError::not_found(anyhow::anyhow!("User with ID {} not found", id))
                })?;

        Ok(user)
    }

    /// Check whether an email is already in use, optionally excluding one
    /// user (the record being updated).
    pub async fn email_taken(
        db: &PgPool,
        email: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, AppError> {
        let existing: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_optional(db)
                .await
                .context("Failed to check email uniqueness")
                .map_err(AppError::database)?;

        Ok(match existing {
            Some((id,)) => exclude_id != Some(id),
            None => false,
        })
    }
}

/// Map a unique-constraint violation on insert/update to a 409; anything
/// else stays a database error. Covers the race between the explicit email
/// check and the write.
pub fn map_unique_violation(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::conflict(anyhow::anyhow!("User with this email already exists"));
        }
    }
    AppError::database(anyhow::Error::from(e))
}
