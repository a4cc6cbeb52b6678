use sqlx::PgPool;

use crate::db::models::{Course, YearOfStudy};

pub(crate) async fn list_courses(pool: &PgPool) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>("SELECT id, name FROM courses ORDER BY name").fetch_all(pool).await
}

pub(crate) async fn create_course(pool: &PgPool, name: &str) -> Result<Course, sqlx::Error> {
    sqlx::query_as::<_, Course>("INSERT INTO courses (name) VALUES ($1) RETURNING id, name")
        .bind(name)
        .fetch_one(pool)
        .await
}

pub(crate) async fn delete_course(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM courses WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn course_exists(
    executor: impl sqlx::PgExecutor<'_>,
    id: i64,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM courses WHERE id = $1)")
        .bind(id)
        .fetch_one(executor)
        .await
}

pub(crate) async fn list_years(pool: &PgPool) -> Result<Vec<YearOfStudy>, sqlx::Error> {
    sqlx::query_as::<_, YearOfStudy>("SELECT id, year FROM years_of_study ORDER BY year")
        .fetch_all(pool)
        .await
}

pub(crate) async fn create_year(pool: &PgPool, year: &str) -> Result<YearOfStudy, sqlx::Error> {
    sqlx::query_as::<_, YearOfStudy>(
        "INSERT INTO years_of_study (year) VALUES ($1) RETURNING id, year",
    )
    .bind(year)
    .fetch_one(pool)
    .await
}

pub(crate) async fn delete_year(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM years_of_study WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn year_exists(
    executor: impl sqlx::PgExecutor<'_>,
    id: i64,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM years_of_study WHERE id = $1)")
        .bind(id)
        .fetch_one(executor)
        .await
}
