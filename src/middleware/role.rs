//! Role-based authorization helpers.
//!
//! Two layers of checks are used across the API:
//! 1. Router-level middleware (`require_admin`) for routes with a single
//!    role rule.
//! 2. Helper functions (`check_any_role`, `check_self_or_admin`) for
//!    handlers whose rule depends on the target resource.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::modules::users::model::UserRole;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub async fn require_roles(
    State(state): State<AppState>,
    req: Request,
    next: Next,
    allowed_roles: Vec<UserRole>,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await?;

    if !allowed_roles.contains(&auth_user.role()) {
        return Err(AppError::forbidden(anyhow::anyhow!(
            "Access denied. Required roles: {:?}, but user has role: {:?}",
            allowed_roles,
            auth_user.role()
        )));
    }

    let req = Request::from_parts(parts, body);
    Ok(next.run(req).await)
}

/// Middleware for admin-only routers.
pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(State(state), req, next, vec![UserRole::Admin]).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Check that the caller has one of the allowed roles.
pub fn check_any_role(auth_user: &AuthUser, allowed_roles: &[UserRole]) -> Result<(), AppError> {
    if !allowed_roles.contains(&auth_user.role()) {
        return Err(AppError::forbidden(anyhow::anyhow!(
            "Access denied. Required roles: {:?}, but user has role: {:?}",
            allowed_roles,
            auth_user.role()
        )));
    }

    Ok(())
}

/// Check that the caller is an admin or is acting on their own record.
pub fn check_self_or_admin(
    auth_user: &AuthUser,
    target_id: Uuid,
    message: &str,
) -> Result<(), AppError> {
    if auth_user.role() == UserRole::Admin {
        return Ok(());
    }

    if auth_user.user_id()? == target_id {
        return Ok(());
    }

    Err(AppError::forbidden(anyhow::anyhow!("{}", message)))
}
