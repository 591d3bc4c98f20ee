use anyhow::Context;
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use crate::modules::assignments::model::AssignedStudent;
use crate::modules::assignments::service::AssignmentService;
use crate::modules::teachers::model::{CreateTeacherDto, Teacher, UpdateTeacherDto};
use crate::modules::users::model::{User, UserRole};
use crate::modules::users::service::{UserService, map_unique_violation};
use crate::utils::errors::AppError;
use crate::utils::password::hash_password;

/// Flat row for the teachers ⋈ users join; assigned students are attached
/// separately.
#[derive(FromRow)]
struct TeacherUserRow {
    id: Uuid,
    instrument: String,
    experience: i32,
    first_name: String,
    last_name: String,
    email: String,
    role: UserRole,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TeacherUserRow {
    fn into_teacher(self, students: Vec<AssignedStudent>) -> Teacher {
        Teacher {
            id: self.id,
            instrument: self.instrument,
            experience: self.experience,
            user: User {
                id: self.id,
                first_name: self.first_name,
                last_name: self.last_name,
                email: self.email,
                role: self.role,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            students,
        }
    }
}

const TEACHER_SELECT: &str = "SELECT t.id, t.instrument, t.experience, u.first_name, \
     u.last_name, u.email, u.role, u.created_at, u.updated_at \
     FROM teachers t JOIN users u ON u.id = t.id";

pub struct TeacherService;

impl TeacherService {
    /// Create the user row and the teacher row in one transaction; either
    /// both commit or neither is visible.
    #[instrument(skip(db, dto))]
    pub async fn create_teacher(db: &PgPool, dto: CreateTeacherDto) -> Result<Teacher, AppError> {
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
        .bind(UserRole::Teacher)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_unique_violation)?;

        sqlx::query("INSERT INTO teachers (id, instrument, experience) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(&dto.instrument)
            .bind(dto.experience)
            .execute(&mut *tx)
            .await
            .context("Failed to insert teacher")
            .map_err(AppError::database)?;

        tx.commit().await?;

        Self::find_one(db, user_id).await
    }

    #[instrument(skip(db))]
    pub async fn find_all(db: &PgPool) -> Result<Vec<Teacher>, AppError> {
        let rows = sqlx::query_as::<_, TeacherUserRow>(&format!(
            "{TEACHER_SELECT} ORDER BY u.last_name, u.first_name"
        ))
        .fetch_all(db)
        .await
        .context("Failed to fetch teachers")
        .map_err(AppError::database)?;

        let mut teachers = Vec::with_capacity(rows.len());
        for row in rows {
            let students = AssignmentService::find_students_by_teacher(db, row.id).await?;
            teachers.push(row.into_teacher(students));
        }

        Ok(teachers)
    }

    #[instrument(skip(db))]
    pub async fn find_one(db: &PgPool, id: Uuid) -> Result<Teacher, AppError> {
        let row = sqlx::query_as::<_, TeacherUserRow>(&format!("{TEACHER_SELECT} WHERE t.id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch teacher by ID")
            .map_err(AppError::database)?
            .ok_or_else(|| {
                AppError::not_found(anyhow::anyhow!("Teacher with ID {} not found", id))
            })?;

        let students = AssignmentService::find_students_by_teacher(db, id).await?;

        Ok(row.into_teacher(students))
    }

    /// Partial update of the user and teacher rows in one transaction.
    #[instrument(skip(db, dto))]
    pub async fn update_teacher(
        db: &PgPool,
        id: Uuid,
        dto: UpdateTeacherDto,
    ) -> Result<Teacher, AppError> {
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
        let experience = dto.experience.unwrap_or(existing.experience);
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

        sqlx::query("UPDATE teachers SET instrument = $1, experience = $2 WHERE id = $3")
            .bind(&instrument)
            .bind(experience)
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to update teacher")
            .map_err(AppError::database)?;

        tx.commit().await?;

        Self::find_one(db, id).await
    }

    /// Delete the owning user row; the teacher row and any lessons or
    /// assignments referencing it cascade.
    #[instrument(skip(db))]
    pub async fn delete_teacher(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        Self::find_one(db, id).await?;

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .context("Failed to delete teacher")
            .map_err(AppError::database)?;

        Ok(())
    }
}
