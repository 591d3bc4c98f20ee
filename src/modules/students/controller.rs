use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::check_any_role;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::lessons::service::LessonService;
use crate::modules::students::model::{CreateStudentDto, Student, UpdateStudentDto};
use crate::modules::students::service::StudentService;
use crate::modules::users::model::UserRole;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

/// Create a student (and its user) in one transaction
#[utoipa::path(
    post,
    path = "/students",
    request_body = CreateStudentDto,
    responses(
        (status = 201, description = "Student created successfully", body = Student),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse),
        (status = 409, description = "Email already in use", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateStudentDto>,
) -> Result<(StatusCode, Json<Student>), AppError> {
    check_any_role(&auth_user, &[UserRole::Admin])?;

    let student = StudentService::create_student(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

/// List all students
#[utoipa::path(
    get,
    path = "/students",
    responses(
        (status = 200, description = "List of students", body = Vec<Student>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_students(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<Student>>, AppError> {
    check_any_role(&auth_user, &[UserRole::Admin, UserRole::Teacher])?;

    let students = StudentService::find_all(&state.db).await?;
    Ok(Json(students))
}

/// Get a student by ID
#[utoipa::path(
    get,
    path = "/students/{id}",
    params(("id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student details", body = Student),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_student(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Student>, AppError> {
    let student = StudentService::find_one(&state.db, id).await?;
    Ok(Json(student))
}

/// Update a student. Admins may update any student; a teacher only a
/// student they have a lesson with.
#[utoipa::path(
    post,
    path = "/students/{id}",
    params(("id" = Uuid, Path, description = "Student ID")),
    request_body = UpdateStudentDto,
    responses(
        (status = 200, description = "Student updated successfully", body = Student),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 409, description = "Email already in use", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateStudentDto>,
) -> Result<Json<Student>, AppError> {
    if auth_user.role() == UserRole::Admin {
        let student = StudentService::update_student(&state.db, id, dto).await?;
        return Ok(Json(student));
    }

    if auth_user.role() == UserRole::Teacher {
        let teacher_id = auth_user.user_id()?;
        if LessonService::exists_between(&state.db, teacher_id, id).await? {
            let student = StudentService::update_student(&state.db, id, dto).await?;
            return Ok(Json(student));
        }
    }

    Err(AppError::forbidden(anyhow::anyhow!(
        "You can only update students you teach"
    )))
}

/// Delete a student and its user record
#[utoipa::path(
    delete,
    path = "/students/{id}",
    params(("id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 204, description = "Student deleted successfully"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    check_any_role(&auth_user, &[UserRole::Admin])?;

    StudentService::delete_student(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
