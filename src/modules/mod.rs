pub mod assignments;
pub mod auth;
pub mod lessons;
pub mod students;
pub mod teachers;
pub mod users;
