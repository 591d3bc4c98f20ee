use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::check_any_role;
use crate::modules::assignments::model::{Assignment, CreateAssignmentDto};
use crate::modules::assignments::service::AssignmentService;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::users::model::UserRole;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

/// Assign a student to a teacher. Teachers may only assign students to
/// themselves.
#[utoipa::path(
    post,
    path = "/assignments",
    request_body = CreateAssignmentDto,
    responses(
        (status = 201, description = "Assignment created successfully", body = Assignment),
        (status = 400, description = "Referenced user has the wrong role", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Teacher or student not found", body = ErrorResponse),
        (status = 409, description = "Pair already assigned", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Assignments"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_assignment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateAssignmentDto>,
) -> Result<(StatusCode, Json<Assignment>), AppError> {
    check_any_role(&auth_user, &[UserRole::Admin, UserRole::Teacher])?;

    if auth_user.role() == UserRole::Teacher && auth_user.user_id()? != dto.teacher_id {
        return Err(AppError::forbidden(anyhow::anyhow!(
            "Teachers can only create assignments for themselves"
        )));
    }

    let assignment = AssignmentService::create_assignment(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

/// Remove an assignment. Admins may remove any; a teacher only their own.
#[utoipa::path(
    delete,
    path = "/assignments/{id}",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    responses(
        (status = 204, description = "Assignment deleted successfully"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Assignment not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Assignments"
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_assignment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    check_any_role(&auth_user, &[UserRole::Admin, UserRole::Teacher])?;

    let assignment = AssignmentService::find_one(&state.db, id).await?;

    if auth_user.role() == UserRole::Teacher && auth_user.user_id()? != assignment.teacher_id {
        return Err(AppError::forbidden(anyhow::anyhow!(
            "Teachers can only remove their own assignments"
        )));
    }

    AssignmentService::delete_assignment(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
