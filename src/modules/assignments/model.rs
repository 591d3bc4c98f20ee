use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::modules::students::model::Student;

/// A standing teacher-student relationship, unique per pair.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Assignment {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub student_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateAssignmentDto {
    pub teacher_id: Uuid,
    pub student_id: Uuid,
}

/// A student reached through an assignment, carrying the id of the linking
/// row so the caller can target that assignment for deletion.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct AssignedStudent {
    pub assignment_id: Uuid,
    pub student: Student,
}
