use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Student;

const COLUMNS: &str = "\
    id, user_id, reg_number, full_name, project_title, supervisor_id, \
    course_id, year_id, created_at";

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: i64,
) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!("SELECT {COLUMNS} FROM students WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn find_by_user_id(
    executor: impl sqlx::PgExecutor<'_>,
    user_id: i64,
) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!("SELECT {COLUMNS} FROM students WHERE user_id = $1"))
        .bind(user_id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn find_id_by_user_id(
    executor: impl sqlx::PgExecutor<'_>,
    user_id: i64,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar("SELECT id FROM students WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn find_by_reg_number(
    executor: impl sqlx::PgExecutor<'_>,
    reg_number: &str,
) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!("SELECT {COLUMNS} FROM students WHERE reg_number = $1"))
        .bind(reg_number.trim())
        .fetch_optional(executor)
        .await
}

/// Row-locks the student so a concurrent assignment waits for this transaction.
pub(crate) async fn lock_by_reg_number(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    reg_number: &str,
) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        "SELECT {COLUMNS} FROM students WHERE reg_number = $1 FOR UPDATE"
    ))
    .bind(reg_number.trim())
    .fetch_optional(&mut **tx)
    .await
}

pub(crate) async fn lock_by_id(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    id: i64,
) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!("SELECT {COLUMNS} FROM students WHERE id = $1 FOR UPDATE"))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
}

/// Locks the given students in id order so concurrent membership writes serialise.
pub(crate) async fn lock_by_ids(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ids: &[i64],
) -> Result<Vec<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        "SELECT {COLUMNS} FROM students WHERE id = ANY($1) ORDER BY id FOR UPDATE"
    ))
    .bind(ids)
    .fetch_all(&mut **tx)
    .await
}

pub(crate) async fn names_by_ids(
    pool: &PgPool,
    ids: &[i64],
) -> Result<Vec<(i64, String)>, sqlx::Error> {
    sqlx::query_as::<_, (i64, String)>("SELECT id, full_name FROM students WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await
}

pub(crate) async fn list(pool: &PgPool, skip: i64, limit: i64) -> Result<Vec<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        "SELECT {COLUMNS} FROM students ORDER BY reg_number OFFSET $1 LIMIT $2"
    ))
    .bind(skip.max(0))
    .bind(limit.clamp(1, 1000))
    .fetch_all(pool)
    .await
}

pub(crate) async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM students").fetch_one(pool).await
}

/// Cohort in the deterministic order used for partitioning.
pub(crate) async fn list_cohort(
    executor: impl sqlx::PgExecutor<'_>,
    course_id: i64,
    year_id: i64,
) -> Result<Vec<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        "SELECT {COLUMNS} FROM students
         WHERE course_id = $1 AND year_id = $2
         ORDER BY reg_number"
    ))
    .bind(course_id)
    .bind(year_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn list_with_cohort(pool: &PgPool) -> Result<Vec<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        "SELECT {COLUMNS} FROM students
         WHERE course_id IS NOT NULL AND year_id IS NOT NULL
         ORDER BY course_id, year_id, reg_number"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_without_group(pool: &PgPool) -> Result<Vec<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        "SELECT {COLUMNS} FROM students s
         WHERE NOT EXISTS (SELECT 1 FROM project_group_members m WHERE m.student_id = s.id)
         ORDER BY reg_number"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_by_supervisor(
    pool: &PgPool,
    supervisor_id: i64,
) -> Result<Vec<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        "SELECT {COLUMNS} FROM students WHERE supervisor_id = $1 ORDER BY reg_number"
    ))
    .bind(supervisor_id)
    .fetch_all(pool)
    .await
}

pub(crate) struct CreateStudent<'a> {
    pub user_id: i64,
    pub reg_number: &'a str,
    pub full_name: &'a str,
    pub course_id: Option<i64>,
    pub year_id: Option<i64>,
    pub created_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateStudent<'_>,
) -> Result<Student, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        "INSERT INTO students (user_id, reg_number, full_name, course_id, year_id, created_at)
         VALUES ($1,$2,$3,$4,$5,$6)
         RETURNING {COLUMNS}"
    ))
    .bind(params.user_id)
    .bind(params.reg_number)
    .bind(params.full_name)
    .bind(params.course_id)
    .bind(params.year_id)
    .bind(params.created_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn set_project_title(
    executor: impl sqlx::PgExecutor<'_>,
    id: i64,
    title: &str,
) -> Result<Student, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        "UPDATE students SET project_title = $1 WHERE id = $2 RETURNING {COLUMNS}"
    ))
    .bind(title)
    .bind(id)
    .fetch_one(executor)
    .await
}

pub(crate) async fn set_supervisor(
    executor: impl sqlx::PgExecutor<'_>,
    id: i64,
    supervisor_id: i64,
) -> Result<Student, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        "UPDATE students SET supervisor_id = $1 WHERE id = $2 RETURNING {COLUMNS}"
    ))
    .bind(supervisor_id)
    .bind(id)
    .fetch_one(executor)
    .await
}
