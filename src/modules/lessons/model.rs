//! Lesson data models and DTOs.
//!
//! A lesson is a scheduled time interval between one teacher and one
//! student. Only the pending → approved transition is driven by the API;
//! the remaining statuses are reserved for the lesson lifecycle.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::modules::users::model::UserRole;

/// Lesson lifecycle status. Stored as the `lesson_status` Postgres enum.
#[derive(
    Serialize, Deserialize, sqlx::Type, Debug, Clone, Copy, PartialEq, Eq, ToSchema,
)]
#[sqlx(type_name = "lesson_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LessonStatus {
    Pending,
    Approved,
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl LessonStatus {
    /// Initial status by creator role: lessons a teacher books are
    /// approved immediately; student and admin requests await approval.
    pub fn initial_for(role: UserRole) -> Self {
        match role {
            UserRole::Teacher => LessonStatus::Approved,
            UserRole::Admin | UserRole::Student => LessonStatus::Pending,
        }
    }
}

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Lesson {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub student_id: Uuid,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: chrono::DateTime<chrono::Utc>,
    pub status: LessonStatus,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateLessonDto {
    pub teacher_id: Uuid,
    pub student_id: Uuid,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: chrono::DateTime<chrono::Utc>,
}

/// Lesson with participant names resolved, for list views.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct LessonDetail {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub student_id: Uuid,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: chrono::DateTime<chrono::Utc>,
    pub status: LessonStatus,
    pub teacher_name: String,
    pub student_name: String,
}
