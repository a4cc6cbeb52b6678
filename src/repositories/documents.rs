use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Document;
use crate::db::types::OwnerKind;
use crate::services::ownership::OwnerRef;

const COLUMNS: &str = "id, title, file_key, owner_kind, owner_id, supervisor_id, uploaded_at";

pub(crate) struct CreateDocument<'a> {
    pub title: &'a str,
    pub file_key: &'a str,
    pub owner: OwnerRef,
    pub supervisor_id: i64,
    pub uploaded_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateDocument<'_>,
) -> Result<Document, sqlx::Error> {
    let (owner_kind, owner_id) = params.owner.into_parts();
    sqlx::query_as::<_, Document>(&format!(
        "INSERT INTO documents (title, file_key, owner_kind, owner_id, supervisor_id, uploaded_at)
         VALUES ($1,$2,$3,$4,$5,$6)
         RETURNING {COLUMNS}"
    ))
    .bind(params.title)
    .bind(params.file_key)
    .bind(owner_kind)
    .bind(owner_id)
    .bind(params.supervisor_id)
    .bind(params.uploaded_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Document>, sqlx::Error> {
    sqlx::query_as::<_, Document>(&format!("SELECT {COLUMNS} FROM documents WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_by_supervisor(
    pool: &PgPool,
    supervisor_id: i64,
) -> Result<Vec<Document>, sqlx::Error> {
    sqlx::query_as::<_, Document>(&format!(
        "SELECT {COLUMNS} FROM documents WHERE supervisor_id = $1 ORDER BY uploaded_at DESC, id DESC"
    ))
    .bind(supervisor_id)
    .fetch_all(pool)
    .await
}

/// Documents owned by the student or by the student's group.
pub(crate) async fn list_for_student(
    pool: &PgPool,
    student_id: i64,
    group_id: Option<i64>,
) -> Result<Vec<Document>, sqlx::Error> {
    sqlx::query_as::<_, Document>(&format!(
        "SELECT {COLUMNS} FROM documents
         WHERE (owner_kind = $1 AND owner_id = $2)
            OR ($3::bigint IS NOT NULL AND owner_kind = $4 AND owner_id = $3)
         ORDER BY uploaded_at DESC, id DESC"
    ))
    .bind(OwnerKind::Student)
    .bind(student_id)
    .bind(group_id)
    .bind(OwnerKind::Group)
    .fetch_all(pool)
    .await
}
