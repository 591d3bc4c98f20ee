use anyhow::Context;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::lessons::model::{CreateLessonDto, Lesson, LessonDetail, LessonStatus};
use crate::modules::users::model::UserRole;
use crate::utils::errors::AppError;

const LESSON_COLUMNS: &str = "id, teacher_id, student_id, start_time, end_time, status";

const LESSON_DETAIL_SELECT: &str =
    "SELECT l.id, l.teacher_id, l.student_id, l.start_time, l.end_time, l.status,
            ut.first_name || ' ' || ut.last_name AS teacher_name,
            us.first_name || ' ' || us.last_name AS student_name
     FROM lessons l
     JOIN users ut ON ut.id = l.teacher_id
     JOIN users us ON us.id = l.student_id";

pub struct LessonService;

impl LessonService {
    /// Create a lesson. Both participants must exist and the interval must
    /// be non-empty; the initial status depends on the creator's role.
    #[instrument(skip(db, dto))]
    pub async fn create_lesson(
        db: &PgPool,
        dto: CreateLessonDto,
        creator_role: UserRole,
    ) -> Result<Lesson, AppError> {
        Self::check_exists(db, "teachers", "Teacher", dto.teacher_id).await?;
        Self::check_exists(db, "students", "Student", dto.student_id).await?;

        if dto.start_time >= dto.end_time {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "End time must be after start time"
            )));
        }

        let status = LessonStatus::initial_for(creator_role);

        let lesson = sqlx::query_as::<_, Lesson>(&format!(
            "INSERT INTO lessons (teacher_id, student_id, start_time, end_time, status)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {LESSON_COLUMNS}"
        ))
        .bind(dto.teacher_id)
        .bind(dto.student_id)
        .bind(dto.start_time)
        .bind(dto.end_time)
        .bind(status)
        .fetch_one(db)
        .await
        .context("Failed to insert lesson")
        .map_err(AppError::database)?;

        Ok(lesson)
    }

    async fn check_exists(
        db: &PgPool,
        table: &str,
        kind: &str,
        id: Uuid,
    ) -> Result<(), AppError> {
        let found: Option<(Uuid,)> =
            sqlx::query_as(&format!("SELECT id FROM {table} WHERE id = $1"))
                .bind(id)
                .fetch_optional(db)
                .await
                .context("Failed to check participant")
                .map_err(AppError::database)?;

        if found.is_none() {
            return Err(AppError::not_found(anyhow::anyhow!(
                "{} with ID {} not found",
                kind,
                id
            )));
        }

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn find_one(db: &PgPool, id: Uuid) -> Result<Lesson, AppError> {
        let lesson = sqlx::query_as::<_, Lesson>(&format!(
            "SELECT {LESSON_COLUMNS} FROM lessons WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("Failed to fetch lesson by ID")
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Lesson with ID {} not found", id)))?;

        Ok(lesson)
    }

    /// The only status transition in the system: pending → approved.
    #[instrument(skip(db))]
    pub async fn approve(db: &PgPool, id: Uuid) -> Result<Lesson, AppError> {
        Self::find_one(db, id).await?;

        let lesson = sqlx::query_as::<_, Lesson>(&format!(
            "UPDATE lessons SET status = $1 WHERE id = $2 RETURNING {LESSON_COLUMNS}"
        ))
        .bind(LessonStatus::Approved)
        .bind(id)
        .fetch_one(db)
        .await
        .context("Failed to approve lesson")
        .map_err(AppError::database)?;

        Ok(lesson)
    }

    #[instrument(skip(db))]
    pub async fn find_by_student(
        db: &PgPool,
        student_id: Uuid,
    ) -> Result<Vec<LessonDetail>, AppError> {
        Self::check_exists(db, "students", "Student", student_id).await?;

        let lessons = sqlx::query_as::<_, LessonDetail>(&format!(
            "{LESSON_DETAIL_SELECT} WHERE l.student_id = $1 ORDER BY l.start_time DESC"
        ))
        .bind(student_id)
        .fetch_all(db)
        .await
        .context("Failed to fetch lessons by student")
        .map_err(AppError::database)?;

        Ok(lessons)
    }

    #[instrument(skip(db))]
    pub async fn find_by_teacher(
        db: &PgPool,
        teacher_id: Uuid,
    ) -> Result<Vec<LessonDetail>, AppError> {
        Self::check_exists(db, "teachers", "Teacher", teacher_id).await?;

        let lessons = sqlx::query_as::<_, LessonDetail>(&format!(
            "{LESSON_DETAIL_SELECT} WHERE l.teacher_id = $1 ORDER BY l.start_time DESC"
        ))
        .bind(teacher_id)
        .fetch_all(db)
        .await
        .context("Failed to fetch lessons by teacher")
        .map_err(AppError::database)?;

        Ok(lessons)
    }

    #[instrument(skip(db))]
    pub async fn find_all(db: &PgPool) -> Result<Vec<LessonDetail>, AppError> {
        let lessons = sqlx::query_as::<_, LessonDetail>(&format!(
            "{LESSON_DETAIL_SELECT} ORDER BY l.start_time DESC"
        ))
        .fetch_all(db)
        .await
        .context("Failed to fetch lessons")
        .map_err(AppError::database)?;

        Ok(lessons)
    }

    /// Whether any lesson links the teacher to the student. Used for the
    /// relationship-gated student update rule.
    pub async fn exists_between(
        db: &PgPool,
        teacher_id: Uuid,
        student_id: Uuid,
    ) -> Result<bool, AppError> {
        let found: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM lessons WHERE teacher_id = $1 AND student_id = $2 LIMIT 1",
        )
        .bind(teacher_id)
        .bind(student_id)
        .fetch_optional(db)
        .await
        .context("Failed to check lesson relationship")
        .map_err(AppError::database)?;

        Ok(found.is_some())
    }
}
