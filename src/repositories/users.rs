use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::User;
use crate::db::types::UserRole;

const COLUMNS: &str =
    "id, username, email, full_name, hashed_password, role, is_active, created_at, updated_at";

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: i64,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn find_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE username = $1"))
        .bind(username)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM users WHERE lower(email) = lower($1)"
    ))
    .bind(email.trim())
    .fetch_optional(pool)
    .await
}

/// Only accounts holding the supervisor role qualify.
pub(crate) async fn find_supervisor(
    executor: impl sqlx::PgExecutor<'_>,
    id: i64,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM users WHERE id = $1 AND role = $2 AND is_active"
    ))
    .bind(id)
    .bind(UserRole::Supervisor)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn list_by_role(pool: &PgPool, role: UserRole) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM users WHERE role = $1 ORDER BY full_name, id"
    ))
    .bind(role)
    .fetch_all(pool)
    .await
}

pub(crate) async fn exists_by_username_or_email(
    pool: &PgPool,
    username: &str,
    email: Option<&str>,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS (
            SELECT 1 FROM users
            WHERE username = $1 OR ($2::text IS NOT NULL AND lower(email) = lower($2))
        )",
    )
    .bind(username)
    .bind(email)
    .fetch_one(pool)
    .await
}

pub(crate) struct CreateUser<'a> {
    pub username: &'a str,
    pub email: Option<&'a str>,
    pub full_name: &'a str,
    pub hashed_password: String,
    pub role: Option<UserRole>,
    pub created_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateUser<'_>,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (
            username, email, full_name, hashed_password, role, is_active, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,TRUE,$6,$6)
        RETURNING {COLUMNS}",
    ))
    .bind(params.username)
    .bind(params.email)
    .bind(params.full_name)
    .bind(params.hashed_password)
    .bind(params.role)
    .bind(params.created_at)
    .fetch_one(executor)
    .await
}

pub(crate) struct UpdateUser {
    pub full_name: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
    pub hashed_password: Option<String>,
    pub updated_at: PrimitiveDateTime,
}

pub(crate) async fn update(pool: &PgPool, id: i64, params: UpdateUser) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE users SET
            full_name = COALESCE($1, full_name),
            role = COALESCE($2, role),
            is_active = COALESCE($3, is_active),
            hashed_password = COALESCE($4, hashed_password),
            updated_at = $5
         WHERE id = $6",
    )
    .bind(params.full_name)
    .bind(params.role)
    .bind(params.is_active)
    .bind(params.hashed_password)
    .bind(params.updated_at)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}
