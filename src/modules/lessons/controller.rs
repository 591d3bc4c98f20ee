use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::{check_any_role, check_self_or_admin};
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::lessons::model::{CreateLessonDto, Lesson, LessonDetail};
use crate::modules::lessons::service::LessonService;
use crate::modules::users::model::UserRole;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

/// Request a lesson. Teacher-created lessons are approved immediately;
/// student- and admin-created lessons start pending.
#[utoipa::path(
    post,
    path = "/lesson",
    request_body = CreateLessonDto,
    responses(
        (status = 201, description = "Lesson created successfully", body = Lesson),
        (status = 400, description = "End time not after start time", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Teacher or student not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Lessons"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_lesson(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateLessonDto>,
) -> Result<(StatusCode, Json<Lesson>), AppError> {
    let lesson = LessonService::create_lesson(&state.db, dto, auth_user.role()).await?;
    Ok((StatusCode::CREATED, Json(lesson)))
}

/// Approve a pending lesson. Admins may approve any lesson; a teacher
/// only their own.
#[utoipa::path(
    post,
    path = "/lesson/{id}/approve",
    params(("id" = Uuid, Path, description = "Lesson ID")),
    responses(
        (status = 200, description = "Lesson approved", body = Lesson),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Lessons"
)]
#[instrument(skip(state, auth_user))]
pub async fn approve_lesson(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Lesson>, AppError> {
    let lesson = LessonService::find_one(&state.db, id).await?;

    if auth_user.role() == UserRole::Admin
        || (auth_user.role() == UserRole::Teacher && auth_user.user_id()? == lesson.teacher_id)
    {
        let approved = LessonService::approve(&state.db, id).await?;
        return Ok(Json(approved));
    }

    Err(AppError::forbidden(anyhow::anyhow!(
        "You can only approve your own lessons or be an admin"
    )))
}

/// Lessons of one student, newest first
#[utoipa::path(
    get,
    path = "/students/{id}/lessons",
    params(("id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Lessons of the student", body = Vec<LessonDetail>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Lessons"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_student_lessons(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<LessonDetail>>, AppError> {
    check_self_or_admin(&auth_user, id, "You can only view your own lessons")?;

    let lessons = LessonService::find_by_student(&state.db, id).await?;
    Ok(Json(lessons))
}

/// Lessons of one teacher, newest first
#[utoipa::path(
    get,
    path = "/teachers/{id}/lessons",
    params(("id" = Uuid, Path, description = "Teacher ID")),
    responses(
        (status = 200, description = "Lessons of the teacher", body = Vec<LessonDetail>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Teacher not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Lessons"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_teacher_lessons(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<LessonDetail>>, AppError> {
    check_self_or_admin(&auth_user, id, "You can only view your own lessons")?;

    let lessons = LessonService::find_by_teacher(&state.db, id).await?;
    Ok(Json(lessons))
}

/// All lessons in the school, newest first
#[utoipa::path(
    get,
    path = "/lessons",
    responses(
        (status = 200, description = "All lessons", body = Vec<LessonDetail>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Lessons"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_lessons(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<LessonDetail>>, AppError> {
    check_any_role(&auth_user, &[UserRole::Admin])?;

    let lessons = LessonService::find_all(&state.db).await?;
    Ok(Json(lessons))
}
