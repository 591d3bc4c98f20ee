use anyhow::Context;
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use crate::modules::students::model::{CreateStudentDto, Student, UpdateStudentDto};
use crate::modules::users::model::{User, UserRole};
use crate::modules::users::service::{UserService, map_unique_violation};
use crate::utils::errors::AppError;
use crate::utils::password::hash_password;

/// Flat row for the students ⋈ users join, composed into [`Student`].
#[derive(FromRow)]
struct StudentUserRow {
    id: Uuid,
    instrument: String,
    first_name: String,
    last_name: String,
    email: String,
    role: UserRole,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<StudentUserRow> for Student {
    fn from(row: StudentUserRow) -> Self {
        Student {
            id: row.id,
            instrument: row.instrument,
            user: User {
                id: row.id,
                first_name: row.first_name,
                last_name: row.last_name,
                email: row.email,
                role: row.role,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

const STUDENT_SELECT: &str = "SELECT s.id, s.instrument, u.first_name, u.last_name, u.email, \
     u.role, u.created_at, u.updated_at FROM students s JOIN users u ON u.id = s.id";

pub struct StudentService;

impl StudentService {
    /// Create the user row and the student row in one transaction; either
    /// both commit or neither is visible.
    #[instrument(skip(db, dto))]
    pub async fn create_student(db: &PgPool, dto: CreateStudentDto) -> Result<Student, AppError> {
        if UserService::email_taken(db, &dto.email, None).await? {
            return Err(AppError::conflict(anyhow::anyhow!(
                "User with this email already exists"
            )));
        }

        let hashed_password = hash_password(&dto.password)?;

        let mut tx = db.begin().await?;

        let (user_id,): (Uuid,) = sqlx::query_as(
            "INSERT INTO users (first_name, last_name, email, password, role)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&dto.email)
        .bind(&hashed_password)
        .bind(UserRole::Student)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_unique_violation)?;

        sqlx::query("INSERT INTO students (id, instrument) VALUES ($1, $2)")
            .bind(user_id)
            .bind(&dto.instrument)
            .execute(&mut *tx)
            .await
            .context("Failed to insert student")
            .map_err(AppError::database)?;

        tx.commit().await?;

        Self::find_one(db, user_id).await
    }

    #[instrument(skip(db))]
    pub async fn find_all(db: &PgPool) -> Result<Vec<Student>, AppError> {
        let rows = sqlx::query_as::<_, StudentUserRow>(&format!(
            "{STUDENT_SELECT} ORDER BY u.last_name, u.first_name"
        ))
        .fetch_all(db)
        .await
        .context("Failed to fetch students")
        .map_err(AppError::database)?;

        Ok(rows.into_iter().map(Student::from).collect())
    }

    #[instrument(skip(db))]
    pub async fn find_one(db: &PgPool, id: Uuid) -> Result<Student, AppError> {
        let row = sqlx::query_as::<_, StudentUserRow>(&format!("{STUDENT_SELECT} WHERE s.id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch student by ID")
            .map_err(AppError::database)?
            .ok_or_else(|| {
                AppError::not_found(anyhow::anyhow!("Student with ID {} not found", id))
            })?;

        Ok(row.into())
    }

    /// Partial update of the user and student rows in one transaction.
    /// Only supplied fields are mutated; the password is re-hashed only
    /// when a new one is given.
    #[instrument(skip(db, dto))]
    pub async fn update_student(
        db: &PgPool,
        id: Uuid,
        dto: UpdateStudentDto,
    ) -> Result<Student, AppError> {
        let existing = Self::find_one(db, id).await?;

        if let Some(email) = &dto.email {
            if email != &existing.user.email && UserService::email_taken(db, email, Some(id)).await?
            {
                return Err(AppError::conflict(anyhow::anyhow!(
                    "User with this email already exists"
                )));
            }
        }

        let first_name = dto.first_name.unwrap_or(existing.user.first_name);
        let last_name = dto.last_name.unwrap_or(existing.user.last_name);
        let email = dto.email.unwrap_or(existing.user.email);
        let instrument = dto.instrument.unwrap_or(existing.instrument);
        let hashed_password = dto.password.as_deref().map(hash_password).transpose()?;

        let mut tx = db.begin().await?;

        sqlx::query(
            "UPDATE users
             SET first_name = $1, last_name = $2, email = $3,
                 password = COALESCE($4, password), updated_at = NOW()
             WHERE id = $5",
        )
        .bind(&first_name)
        .bind(&last_name)
        .bind(&email)
        .bind(&hashed_password)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(map_unique_violation)?;

        sqlx::query("UPDATE students SET instrument = $1 WHERE id = $2")
            .bind(&instrument)
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to update student")
            .map_err(AppError::database)?;

        tx.commit().await?;

        Self::find_one(db, id).await
    }

    /// Delete the owning user row; the student row and any lessons or
    /// assignments referencing it cascade.
    #[instrument(skip(db))]
    pub async fn delete_student(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        Self::find_one(db, id).await?;

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .context("Failed to delete student")
            .map_err(AppError::database)?;

        Ok(())
    }
}
