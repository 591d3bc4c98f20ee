use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::{check_any_role, check_self_or_admin};
use crate::modules::assignments::model::AssignedStudent;
use crate::modules::assignments::service::AssignmentService;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::teachers::model::{CreateTeacherDto, Teacher, UpdateTeacherDto};
use crate::modules::teachers::service::TeacherService;
use crate::modules::users::model::UserRole;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

/// Create a teacher (and its user) in one transaction
#[utoipa::path(
    post,
    path = "/teachers",
    request_body = CreateTeacherDto,
    responses(
        (status = 201, description = "Teacher created successfully", body = Teacher),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse),
        (status = 409, description = "Email already in use", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Teachers"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_teacher(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateTeacherDto>,
) -> Result<(StatusCode, Json<Teacher>), AppError> {
    check_any_role(&auth_user, &[UserRole::Admin])?;

    let teacher = TeacherService::create_teacher(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(teacher)))
}

/// List all teachers with their assigned students
#[utoipa::path(
    get,
    path = "/teachers",
    responses(
        (status = 200, description = "List of teachers", body = Vec<Teacher>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Teachers"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_teachers(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<Teacher>>, AppError> {
    check_any_role(&auth_user, &[UserRole::Admin])?;

    let teachers = TeacherService::find_all(&state.db).await?;
    Ok(Json(teachers))
}

/// Get a teacher by ID
#[utoipa::path(
    get,
    path = "/teachers/{id}",
    params(("id" = Uuid, Path, description = "Teacher ID")),
    responses(
        (status = 200, description = "Teacher details", body = Teacher),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Teacher not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Teachers"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_teacher(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Teacher>, AppError> {
    let teacher = TeacherService::find_one(&state.db, id).await?;
    Ok(Json(teacher))
}

/// Students currently assigned to a teacher
#[utoipa::path(
    get,
    path = "/teachers/{id}/students",
    params(("id" = Uuid, Path, description = "Teacher ID")),
    responses(
        (status = 200, description = "Assigned students", body = Vec<AssignedStudent>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Teacher not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Teachers"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_teacher_students(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<AssignedStudent>>, AppError> {
    check_any_role(&auth_user, &[UserRole::Admin, UserRole::Teacher])?;
    check_self_or_admin(&auth_user, id, "You can only view your own students")?;

    TeacherService::find_one(&state.db, id).await?;

    let students = AssignmentService::find_students_by_teacher(&state.db, id).await?;
    Ok(Json(students))
}

/// Update a teacher profile; admins may update any teacher
#[utoipa::path(
    patch,
    path = "/teachers/{id}",
    params(("id" = Uuid, Path, description = "Teacher ID")),
    request_body = UpdateTeacherDto,
    responses(
        (status = 200, description = "Teacher updated successfully", body = Teacher),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Teacher not found", body = ErrorResponse),
        (status = 409, description = "Email already in use", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Teachers"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_teacher(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateTeacherDto>,
) -> Result<Json<Teacher>, AppError> {
    check_self_or_admin(&auth_user, id, "You can only update your own profile")?;

    let teacher = TeacherService::update_teacher(&state.db, id, dto).await?;
    Ok(Json(teacher))
}

/// Delete a teacher and its user record
#[utoipa::path(
    delete,
    path = "/teachers/{id}",
    params(("id" = Uuid, Path, description = "Teacher ID")),
    responses(
        (status = 204, description = "Teacher deleted successfully"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse),
        (status = 404, description = "Teacher not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Teachers"
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_teacher(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    check_any_role(&auth_user, &[UserRole::Admin])?;

    TeacherService::delete_teacher(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
