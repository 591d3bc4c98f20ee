use axum::body::Body;
use axum::http::Request;
use http_body_util::BodyExt;
use maestro::config::cors::CorsConfig;
use maestro::config::jwt::JwtConfig;
use maestro::router::init_router;
use maestro::state::AppState;
use maestro::utils::password::hash_password;
#[allow(unused_imports)]
use sqlx::{PgPool, Postgres, Transaction};
use tower::ServiceExt;
use uuid::Uuid;

pub async fn setup_test_app(pool: PgPool) -> axum::Router {
    dotenvy::dotenv().ok();
    let state = AppState {
        db: pool.clone(),
        jwt_config: JwtConfig::from_env(),
        cors_config: CorsConfig::from_env(),
    };
    init_router(state)
}

pub async fn get_auth_token(app: axum::Router, email: &str, password: &str) -> String {
    let request = Request::builder()
        .method("POST")
        .uri("/auth")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({
                "email": email,
                "password": password
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    body["access_token"].as_str().unwrap().to_string()
}

#[allow(dead_code)]
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub password: String,
}

/// Create a bare user row with the given role.
/// role should be one of: "admin", "teacher", "student"
pub async fn create_test_user(
    tx: &mut Transaction<'_, Postgres>,
    email: &str,
    password: &str,
    role: &str,
) -> TestUser {
    let hashed = hash_password(password).unwrap();

    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (first_name, last_name, email, password, role)
        VALUES ($1, $2, $3, $4, $5::user_role)
        RETURNING id
        "#,
    )
    .bind("Test")
    .bind("User")
    .bind(email)
    .bind(hashed)
    .bind(role)
    .fetch_one(&mut **tx)
    .await
    .unwrap();

    TestUser {
        id,
        email: email.to_string(),
        password: password.to_string(),
    }
}

/// Create a user with role teacher plus its teachers row.
#[allow(dead_code)]
pub async fn create_test_teacher(
    tx: &mut Transaction<'_, Postgres>,
    email: &str,
    password: &str,
) -> TestUser {
    let user = create_test_user(tx, email, password, "teacher").await;

    sqlx::query("INSERT INTO teachers (id, instrument, experience) VALUES ($1, $2, $3)")
        .bind(user.id)
        .bind("Piano")
        .bind(5)
        .execute(&mut **tx)
        .await
        .unwrap();

    user
}

/// Create a user with role student plus its students row.
#[allow(dead_code)]
pub async fn create_test_student(
    tx: &mut Transaction<'_, Postgres>,
    email: &str,
    password: &str,
) -> TestUser {
    let user = create_test_user(tx, email, password, "student").await;

    sqlx::query("INSERT INTO students (id, instrument) VALUES ($1, $2)")
        .bind(user.id)
        .bind("Violin")
        .execute(&mut **tx)
        .await
        .unwrap();

    user
}

#[allow(dead_code)]
pub async fn create_test_lesson(
    tx: &mut Transaction<'_, Postgres>,
    teacher_id: Uuid,
    student_id: Uuid,
    status: &str,
) -> Uuid {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO lessons (teacher_id, student_id, start_time, end_time, status)
        VALUES ($1, $2, NOW() + INTERVAL '1 day', NOW() + INTERVAL '1 day 1 hour', $3::lesson_status)
        RETURNING id
        "#,
    )
    .bind(teacher_id)
    .bind(student_id)
    .bind(status)
    .fetch_one(&mut **tx)
    .await
    .unwrap();

    id
}

#[allow(dead_code)]
pub async fn create_test_assignment(
    tx: &mut Transaction<'_, Postgres>,
    teacher_id: Uuid,
    student_id: Uuid,
) -> Uuid {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO assignments (teacher_id, student_id)
        VALUES ($1, $2)
        RETURNING id
        "#,
    )
    .bind(teacher_id)
    .bind(student_id)
    .fetch_one(&mut **tx)
    .await
    .unwrap();

    id
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}
