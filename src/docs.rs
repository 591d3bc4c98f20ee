use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::assignments::model::{AssignedStudent, Assignment, CreateAssignmentDto};
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::auth::model::{LoginRequest, LoginResponse, MeResponse, MessageResponse};
use crate::modules::lessons::model::{CreateLessonDto, Lesson, LessonDetail, LessonStatus};
use crate::modules::students::model::{CreateStudentDto, Student, UpdateStudentDto};
use crate::modules::teachers::model::{CreateTeacherDto, Teacher, UpdateTeacherDto};
use crate::modules::users::model::{CreateUserDto, User, UserRole};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::logout,
        crate::modules::auth::controller::me,
        crate::modules::users::controller::create_user,
        crate::modules::users::controller::get_users,
        crate::modules::users::controller::get_user,
        crate::modules::teachers::controller::create_teacher,
        crate::modules::teachers::controller::get_teachers,
        crate::modules::teachers::controller::get_teacher,
        crate::modules::teachers::controller::get_teacher_students,
        crate::modules::teachers::controller::update_teacher,
        crate::modules::teachers::controller::delete_teacher,
        crate::modules::students::controller::create_student,
        crate::modules::students::controller::get_students,
        crate::modules::students::controller::get_student,
        crate::modules::students::controller::update_student,
        crate::modules::students::controller::delete_student,
        crate::modules::assignments::controller::create_assignment,
        crate::modules::assignments::controller::delete_assignment,
        crate::modules::lessons::controller::create_lesson,
        crate::modules::lessons::controller::approve_lesson,
        crate::modules::lessons::controller::get_student_lessons,
        crate::modules::lessons::controller::get_teacher_lessons,
        crate::modules::lessons::controller::get_lessons,
    ),
    components(
        schemas(
            User,
            UserRole,
            CreateUserDto,
            Teacher,
            CreateTeacherDto,
            UpdateTeacherDto,
            Student,
            CreateStudentDto,
            UpdateStudentDto,
            Assignment,
            CreateAssignmentDto,
            AssignedStudent,
            Lesson,
            LessonDetail,
            LessonStatus,
            CreateLessonDto,
            LoginRequest,
            LoginResponse,
            MeResponse,
            MessageResponse,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login, logout, and caller identity"),
        (name = "Users", description = "Direct user management"),
        (name = "Teachers", description = "Teacher management"),
        (name = "Students", description = "Student management"),
        (name = "Assignments", description = "Teacher-student assignments"),
        (name = "Lessons", description = "Lesson scheduling and approval"),
    ),
    info(
        title = "Maestro API",
        description = "Music school administration API",
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
