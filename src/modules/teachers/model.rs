//! Teacher data models and DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::modules::assignments::model::AssignedStudent;
use crate::modules::users::model::User;

/// A teacher record with its owning user and currently assigned students.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Teacher {
    pub id: Uuid,
    pub instrument: String,
    pub experience: i32,
    pub user: User,
    pub students: Vec<AssignedStudent>,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateTeacherDto {
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(length(min = 1))]
    pub instrument: String,
    #[validate(range(min = 0))]
    pub experience: i32,
}

/// Partial update; absent fields are left untouched.
#[derive(Deserialize, Debug, Clone, Default, Validate, ToSchema)]
pub struct UpdateTeacherDto {
    #[validate(length(min = 1))]
    pub first_name: Option<String>,
    #[validate(length(min = 1))]
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8))]
    pub password: Option<String>,
    #[validate(length(min = 1))]
    pub instrument: Option<String>,
    #[validate(range(min = 0))]
    pub experience: Option<i32>,
}
