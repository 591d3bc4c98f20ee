mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{
    create_test_assignment, create_test_student, create_test_teacher, create_test_user,
    generate_unique_email, get_auth_token, setup_test_app,
};
use http_body_util::BodyExt;
use maestro::modules::teachers::model::CreateTeacherDto;
use maestro::modules::teachers::service::TeacherService;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

#[sqlx::test(migrations = "./migrations")]
async fn test_create_teacher_as_admin(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let admin_email = generate_unique_email();
    let password = "testpass123";
    create_test_user(&mut tx, &admin_email, password, "admin").await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app.clone(), &admin_email, password).await;

    let teacher_email = generate_unique_email();
    let request = Request::builder()
        .method("POST")
        .uri("/teachers")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(
            json!({
                "first_name": "Maria",
                "last_name": "Rodriguez",
                "email": teacher_email,
                "password": "teacherpass123",
                "instrument": "Piano",
                "experience": 15
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["instrument"], "Piano");
    assert_eq!(body["experience"], 15);
    assert_eq!(body["user"]["email"], teacher_email);
    assert_eq!(body["user"]["role"], "teacher");
    assert!(body["user"].get("password").is_none());
    assert_eq!(body["students"].as_array().unwrap().len(), 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_teacher_duplicate_email_conflict(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let admin_email = generate_unique_email();
    let password = "testpass123";
    create_test_user(&mut tx, &admin_email, password, "admin").await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app.clone(), &admin_email, password).await;

    let teacher_email = generate_unique_email();
    let payload = json!({
        "first_name": "James",
        "last_name": "Chen",
        "email": teacher_email,
        "password": "teacherpass123",
        "instrument": "Guitar",
        "experience": 12
    })
    .to_string();

    let create = |body: String, token: String| {
        Request::builder()
            .method("POST")
            .uri("/teachers")
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {}", token))
            .body(Body::from(body))
            .unwrap()
    };

    let response = app
        .clone()
        .oneshot(create(payload.clone(), token.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.oneshot(create(payload, token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"], "User with this email already exists");

    // Only the first create left rows behind
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = $1")
        .bind(&teacher_email)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_teacher_as_student_forbidden(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let student_email = generate_unique_email();
    let password = "testpass123";
    create_test_user(&mut tx, &student_email, password, "student").await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app.clone(), &student_email, password).await;

    let request = Request::builder()
        .method("POST")
        .uri("/teachers")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(
            json!({
                "first_name": "Nope",
                "last_name": "Nope",
                "email": generate_unique_email(),
                "password": "teacherpass123",
                "instrument": "Drums",
                "experience": 1
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// The teachers insert violates the experience CHECK constraint after the
// users insert already succeeded; the transaction must roll both back.
#[sqlx::test(migrations = "./migrations")]
async fn test_create_teacher_rolls_back_user_row(pool: PgPool) {
    let email = generate_unique_email();

    let result = TeacherService::create_teacher(
        &pool,
        CreateTeacherDto {
            first_name: "Broken".to_string(),
            last_name: "Row".to_string(),
            email: email.clone(),
            password: "teacherpass123".to_string(),
            instrument: "Cello".to_string(),
            experience: -1,
        },
    )
    .await;

    assert!(result.is_err());

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = $1")
        .bind(&email)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0, "user row must not survive the failed teacher insert");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_own_profile_partial(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let teacher_email = generate_unique_email();
    let password = "testpass123";
    let teacher = create_test_teacher(&mut tx, &teacher_email, password).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app.clone(), &teacher_email, password).await;

    let request = Request::builder()
        .method("POST")
        .uri(format!("/teachers/{}", teacher.id))
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(json!({ "experience": 20 }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    // Supplied field changed, the rest untouched
    assert_eq!(body["experience"], 20);
    assert_eq!(body["instrument"], "Piano");
    assert_eq!(body["user"]["email"], teacher_email);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_other_teacher_forbidden(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let t1_email = generate_unique_email();
    let password = "testpass123";
    create_test_teacher(&mut tx, &t1_email, password).await;
    let t2 = create_test_teacher(&mut tx, &generate_unique_email(), password).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app.clone(), &t1_email, password).await;

    let request = Request::builder()
        .method("PATCH")
        .uri(format!("/teachers/{}", t2.id))
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(json!({ "experience": 3 }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_teacher_email_conflict(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let password = "testpass123";
    let admin_email = generate_unique_email();
    create_test_user(&mut tx, &admin_email, password, "admin").await;
    let taken_email = generate_unique_email();
    create_test_teacher(&mut tx, &taken_email, password).await;
    let target = create_test_teacher(&mut tx, &generate_unique_email(), password).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app.clone(), &admin_email, password).await;

    let request = Request::builder()
        .method("PATCH")
        .uri(format!("/teachers/{}", target.id))
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(json!({ "email": taken_email }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_get_teacher_includes_assigned_students(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let password = "testpass123";
    let admin_email = generate_unique_email();
    create_test_user(&mut tx, &admin_email, password, "admin").await;
    let teacher = create_test_teacher(&mut tx, &generate_unique_email(), password).await;
    let student = create_test_student(&mut tx, &generate_unique_email(), password).await;
    let assignment_id = create_test_assignment(&mut tx, teacher.id, student.id).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app.clone(), &admin_email, password).await;

    let request = Request::builder()
        .method("GET")
        .uri(format!("/teachers/{}", teacher.id))
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let students = body["students"].as_array().unwrap();
    assert_eq!(students.len(), 1);
    assert_eq!(students[0]["assignment_id"], assignment_id.to_string());
    assert_eq!(students[0]["student"]["id"], student.id.to_string());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_teacher_cascades(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let password = "testpass123";
    let admin_email = generate_unique_email();
    create_test_user(&mut tx, &admin_email, password, "admin").await;
    let teacher = create_test_teacher(&mut tx, &generate_unique_email(), password).await;
    let student = create_test_student(&mut tx, &generate_unique_email(), password).await;
    create_test_assignment(&mut tx, teacher.id, student.id).await;
    common::create_test_lesson(&mut tx, teacher.id, student.id, "pending").await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app.clone(), &admin_email, password).await;

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/teachers/{}", teacher.id))
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // User row gone, and lessons/assignments referencing the teacher with it
    let (users,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE id = $1")
        .bind(teacher.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(users, 0);

    let (lessons,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM lessons WHERE teacher_id = $1")
        .bind(teacher.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(lessons, 0);

    let (assignments,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM assignments WHERE teacher_id = $1")
            .bind(teacher.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(assignments, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_teacher_as_teacher_forbidden(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let password = "testpass123";
    let teacher_email = generate_unique_email();
    let teacher = create_test_teacher(&mut tx, &teacher_email, password).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app.clone(), &teacher_email, password).await;

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/teachers/{}", teacher.id))
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
