//! Student data models and DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::modules::users::model::User;

/// A student record with its owning user, password excluded.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Student {
    pub id: Uuid,
    pub instrument: String,
    pub user: User,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateStudentDto {
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
}

/// Partial update; absent fields are left untouched.
#[derive(Deserialize, Debug, Clone, Default, Validate, ToSchema)]
pub struct UpdateStudentDto {
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
}
