use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Project;
use crate::db::types::OwnerKind;
use crate::services::ownership::OwnerRef;

const COLUMNS: &str = "id, title, description, owner_kind, owner_id, supervisor_id, created_at";

pub(crate) struct CreateProject<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub owner: OwnerRef,
    pub supervisor_id: Option<i64>,
    pub created_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateProject<'_>,
) -> Result<Project, sqlx::Error> {
    let (owner_kind, owner_id) = params.owner.into_parts();
    sqlx::query_as::<_, Project>(&format!(
        "INSERT INTO projects (title, description, owner_kind, owner_id, supervisor_id, created_at)
         VALUES ($1,$2,$3,$4,$5,$6)
         RETURNING {COLUMNS}"
    ))
    .bind(params.title)
    .bind(params.description)
    .bind(owner_kind)
    .bind(owner_id)
    .bind(params.supervisor_id)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn list_all(pool: &PgPool) -> Result<Vec<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>(&format!(
        "SELECT {COLUMNS} FROM projects ORDER BY created_at DESC, id DESC"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_by_supervisor(
    pool: &PgPool,
    supervisor_id: i64,
) -> Result<Vec<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>(&format!(
        "SELECT {COLUMNS} FROM projects WHERE supervisor_id = $1 ORDER BY created_at DESC, id DESC"
    ))
    .bind(supervisor_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_for_student(
    pool: &PgPool,
    student_id: i64,
    group_id: Option<i64>,
) -> Result<Vec<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>(&format!(
        "SELECT {COLUMNS} FROM projects
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
