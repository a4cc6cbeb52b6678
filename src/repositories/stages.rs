use sqlx::PgPool;

use crate::db::models::Stage;

pub(crate) async fn list(pool: &PgPool) -> Result<Vec<Stage>, sqlx::Error> {
    sqlx::query_as::<_, Stage>("SELECT id, name, description FROM stages ORDER BY id")
        .fetch_all(pool)
        .await
}

pub(crate) async fn exists(
    executor: impl sqlx::PgExecutor<'_>,
    id: i64,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM stages WHERE id = $1)")
        .bind(id)
        .fetch_one(executor)
        .await
}

pub(crate) async fn create(
    pool: &PgPool,
    name: &str,
    description: Option<&str>,
) -> Result<Stage, sqlx::Error> {
    sqlx::query_as::<_, Stage>(
        "INSERT INTO stages (name, description) VALUES ($1, $2) RETURNING id, name, description",
    )
    .bind(name)
    .bind(description)
    .fetch_one(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM stages WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
