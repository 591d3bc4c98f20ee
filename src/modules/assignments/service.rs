use anyhow::Context;
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use crate::modules::assignments::model::{AssignedStudent, Assignment, CreateAssignmentDto};
use crate::modules::students::model::Student;
use crate::modules::users::model::{User, UserRole};
use crate::utils::errors::AppError;

#[derive(FromRow)]
struct AssignedStudentRow {
    assignment_id: Uuid,
    id: Uuid,
    instrument: String,
    first_name: String,
    last_name: String,
    email: String,
    role: UserRole,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<AssignedStudentRow> for AssignedStudent {
    fn from(row: AssignedStudentRow) -> Self {
        AssignedStudent {
            assignment_id: row.assignment_id,
            student: Student {
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
            },
        }
    }
}

pub struct AssignmentService;

impl AssignmentService {
    /// Create an assignment after checking that the referenced ids resolve
    /// to a user whose role is exactly teacher resp. student, and that the
    /// pair is not already assigned.
    #[instrument(skip(db))]
    pub async fn create_assignment(
        db: &PgPool,
        dto: CreateAssignmentDto,
    ) -> Result<Assignment, AppError> {
        Self::check_role_of(db, "teachers", dto.teacher_id, UserRole::Teacher).await?;
        Self::check_role_of(db, "students", dto.student_id, UserRole::Student).await?;

        let existing: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM assignments WHERE teacher_id = $1 AND student_id = $2",
        )
        .bind(dto.teacher_id)
        .bind(dto.student_id)
        .fetch_optional(db)
        .await
        .context("Failed to check for existing assignment")
        .map_err(AppError::database)?;

        if existing.is_some() {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Assignment between teacher {} and student {} already exists",
                dto.teacher_id,
                dto.student_id
            )));
        }

        let assignment = sqlx::query_as::<_, Assignment>(
            "INSERT INTO assignments (teacher_id, student_id)
             VALUES ($1, $2)
             RETURNING id, teacher_id, student_id, created_at",
        )
        .bind(dto.teacher_id)
        .bind(dto.student_id)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::conflict(anyhow::anyhow!(
                        "Assignment between teacher {} and student {} already exists",
                        dto.teacher_id,
                        dto.student_id
                    ));
                }
            }
            AppError::database(anyhow::Error::from(e))
        })?;

        Ok(assignment)
    }

    /// The role record must exist AND the owning user's role must match.
    /// A bare row in the role table is not enough.
    async fn check_role_of(
        db: &PgPool,
        table: &str,
        id: Uuid,
        expected: UserRole,
    ) -> Result<(), AppError> {
        let kind = match expected {
            UserRole::Teacher => "Teacher",
            UserRole::Student => "Student",
            UserRole::Admin => "Admin",
        };

        let role: Option<(UserRole,)> = sqlx::query_as(&format!(
            "SELECT u.role FROM {table} t JOIN users u ON u.id = t.id WHERE t.id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("Failed to resolve role record")
        .map_err(AppError::database)?;

        match role {
            None => Err(AppError::not_found(anyhow::anyhow!(
                "{} with ID {} not found",
                kind,
                id
            ))),
            Some((role,)) if role != expected => Err(AppError::bad_request(anyhow::anyhow!(
                "User with ID {} is not a {}",
                id,
                kind.to_lowercase()
            ))),
            Some(_) => Ok(()),
        }
    }

    /// Students currently assigned to a teacher, each carrying the id of
    /// the linking assignment.
    #[instrument(skip(db))]
    pub async fn find_students_by_teacher(
        db: &PgPool,
        teacher_id: Uuid,
    ) -> Result<Vec<AssignedStudent>, AppError> {
        let rows = sqlx::query_as::<_, AssignedStudentRow>(
            "SELECT a.id AS assignment_id, s.id, s.instrument,
                    u.first_name, u.last_name, u.email, u.role, u.created_at, u.updated_at
             FROM assignments a
             JOIN students s ON s.id = a.student_id
             JOIN users u ON u.id = s.id
             WHERE a.teacher_id = $1
             ORDER BY u.last_name, u.first_name",
        )
        .bind(teacher_id)
        .fetch_all(db)
        .await
        .context("Failed to fetch assigned students")
        .map_err(AppError::database)?;

        Ok(rows.into_iter().map(AssignedStudent::from).collect())
    }

    #[instrument(skip(db))]
    pub async fn find_one(db: &PgPool, id: Uuid) -> Result<Assignment, AppError> {
        let assignment = sqlx::query_as::<_, Assignment>(
            "SELECT id, teacher_id, student_id, created_at FROM assignments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await
        .context("Failed to fetch assignment by ID")
        .map_err(AppError::database)?
        .ok_or_else(|| {
            AppError::not_found(anyhow::anyhow!("Assignment with ID {} not found", id))
        })?;

        Ok(assignment)
    }

    #[instrument(skip(db))]
    pub async fn delete_assignment(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM assignments WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .context("Failed to delete assignment")
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!(
                "Assignment with ID {} not found",
                id
            )));
        }

        Ok(())
    }
}
