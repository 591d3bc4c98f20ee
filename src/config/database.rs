//! PostgreSQL connection pool initialization.
//!
//! The connection string is read from the `DATABASE_URL` environment
//! variable. Pending migrations from `./migrations` are applied before the
//! pool is handed to the application state.
//!
//! # Panics
//!
//! [`init_db_pool`] panics if `DATABASE_URL` is unset, the connection
//! cannot be established, or a migration fails; there is nothing useful
//! the server can do without a database.

use sqlx::PgPool;
use std::env;

pub async fn init_db_pool() -> PgPool {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    pool
}
