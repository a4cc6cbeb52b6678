use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Feedback;
use crate::db::types::OwnerKind;
use crate::services::ownership::OwnerRef;

const COLUMNS: &str = "id, owner_kind, owner_id, supervisor_id, content, created_at";

pub(crate) async fn create(
    pool: &PgPool,
    owner: OwnerRef,
    supervisor_id: i64,
    content: &str,
    created_at: PrimitiveDateTime,
) -> Result<Feedback, sqlx::Error> {
    let (owner_kind, owner_id) = owner.into_parts();
    sqlx::query_as::<_, Feedback>(&format!(
        "INSERT INTO feedback (owner_kind, owner_id, supervisor_id, content, created_at)
         VALUES ($1,$2,$3,$4,$5)
         RETURNING {COLUMNS}"
    ))
    .bind(owner_kind)
    .bind(owner_id)
    .bind(supervisor_id)
    .bind(content)
    .bind(created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn list_by_supervisor(
    pool: &PgPool,
    supervisor_id: i64,
) -> Result<Vec<Feedback>, sqlx::Error> {
    sqlx::query_as::<_, Feedback>(&format!(
        "SELECT {COLUMNS} FROM feedback WHERE supervisor_id = $1 ORDER BY created_at DESC, id DESC"
    ))
    .bind(supervisor_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_for_student(
    pool: &PgPool,
    student_id: i64,
    group_id: Option<i64>,
) -> Result<Vec<Feedback>, sqlx::Error> {
    sqlx::query_as::<_, Feedback>(&format!(
        "SELECT {COLUMNS} FROM feedback
         WHERE (owner_kind = $1 AND owner_id = $2)
            OR ($3::bigint IS NOT NULL AND owner_kind = $4 AND owner_id = $3)
         ORDER BY created_at DESC, id DESC"
    ))
    .bind(OwnerKind::Student)
    .bind(student_id)
    .bind(group_id)
    .bind(OwnerKind::Group)
    .fetch_all(pool)
    .await
}
