use axum::{Json, extract::State};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use time::Duration;
use tracing::instrument;
use utoipa::ToSchema;

use super::model::{LoginRequest, LoginResponse, MeResponse, MessageResponse};
use super::service::AuthService;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

fn access_token_cookie(token: String) -> Cookie<'static> {
    // Secure only outside local development so the cookie still works
    // over plain http on localhost.
    let production = std::env::var("APP_ENV")
        .map(|env| env == "production")
        .unwrap_or(false);

    Cookie::build((ACCESS_TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(production)
        .same_site(SameSite::Lax)
        .max_age(Duration::hours(24))
        .build()
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, jar, dto))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    let response = AuthService::login(&state.db, dto, &state.jwt_config).await?;

    let jar = jar.add(access_token_cookie(response.access_token.clone()));

    Ok((jar, Json(response)))
}

/// Logout by clearing the access token cookie
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(jar))]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    let jar = jar.remove(Cookie::build((ACCESS_TOKEN_COOKIE, "")).path("/").build());

    (
        jar,
        Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }),
    )
}

/// Get the caller's identity from the bearer credential
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Caller identity", body = MeResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
#[instrument(skip(auth_user))]
pub async fn me(auth_user: AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: auth_user.0.sub,
        email: auth_user.0.email,
        role: auth_user.0.role,
    })
}
