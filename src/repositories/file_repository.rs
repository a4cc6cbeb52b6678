use sqlx::{PgPool, Postgres, QueryBuilder};
use time::PrimitiveDateTime;

use crate::db::models::FileEntry;
use crate::db::types::FileType;
use crate::services::ownership::OwnerRef;

const COLUMNS: &str = "\
    id, student_id, group_id, file_key, file_name, file_type, description, \
    size_bytes, checksum, version, year, uploaded_at";

pub(crate) struct CreateFileEntry<'a> {
    pub owner: OwnerRef,
    pub file_key: &'a str,
    pub file_name: &'a str,
    pub file_type: FileType,
    pub description: &'a str,
    pub size_bytes: i64,
    pub checksum: &'a str,
    pub version: i32,
    pub year: Option<&'a str>,
    pub uploaded_at: PrimitiveDateTime,
}

/// The owner arrives as an [`OwnerRef`], so exactly one of the columns is filled.
pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateFileEntry<'_>,
) -> Result<FileEntry, sqlx::Error> {
    sqlx::query_as::<_, FileEntry>(&format!(
        "INSERT INTO file_repository (
            student_id, group_id, file_key, file_name, file_type, description,
            size_bytes, checksum, version, year, uploaded_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)
         RETURNING {COLUMNS}"
    ))
    .bind(params.owner.student_id())
    .bind(params.owner.group_id())
    .bind(params.file_key)
    .bind(params.file_name)
    .bind(params.file_type)
    .bind(params.description)
    .bind(params.size_bytes)
    .bind(params.checksum)
    .bind(params.version)
    .bind(params.year)
    .bind(params.uploaded_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn next_version(
    executor: impl sqlx::PgExecutor<'_>,
    owner: OwnerRef,
    file_type: FileType,
    file_name: &str,
) -> Result<i32, sqlx::Error> {
    let current: Option<i32> = sqlx::query_scalar(
        "SELECT MAX(version) FROM file_repository
         WHERE student_id IS NOT DISTINCT FROM $1
           AND group_id IS NOT DISTINCT FROM $2
           AND file_type = $3
           AND file_name = $4",
    )
    .bind(owner.student_id())
    .bind(owner.group_id())
    .bind(file_type)
    .bind(file_name)
    .fetch_one(executor)
    .await?;

    Ok(current.unwrap_or(0) + 1)
}

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: i64,
) -> Result<Option<FileEntry>, sqlx::Error> {
    sqlx::query_as::<_, FileEntry>(&format!("SELECT {COLUMNS} FROM file_repository WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

#[derive(Debug, Default, Clone)]
pub(crate) struct FileFilter {
    pub file_type: Option<FileType>,
    pub year: Option<String>,
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &FileFilter) {
    builder.push(" WHERE TRUE");
    if let Some(file_type) = filter.file_type {
        builder.push(" AND file_type = ");
        builder.push_bind(file_type);
    }
    if let Some(year) = &filter.year {
        builder.push(" AND year = ");
        builder.push_bind(year.clone());
    }
}

pub(crate) async fn list(
    pool: &PgPool,
    filter: &FileFilter,
    skip: i64,
    limit: i64,
) -> Result<Vec<FileEntry>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM file_repository"));
    push_filter(&mut builder, filter);
    builder.push(" ORDER BY uploaded_at DESC, id DESC OFFSET ");
    builder.push_bind(skip.max(0));
    builder.push(" LIMIT ");
    builder.push_bind(limit.clamp(1, 1000));

    builder.build_query_as::<FileEntry>().fetch_all(pool).await
}

pub(crate) async fn count(pool: &PgPool, filter: &FileFilter) -> Result<i64, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM file_repository");
    push_filter(&mut builder, filter);
    builder.build_query_scalar::<i64>().fetch_one(pool).await
}

pub(crate) struct UpdateFileEntry {
    pub description: String,
    pub file_type: FileType,
    pub year: Option<String>,
    pub owner: OwnerRef,
}

pub(crate) async fn update(
    executor: impl sqlx::PgExecutor<'_>,
    id: i64,
    params: UpdateFileEntry,
) -> Result<FileEntry, sqlx::Error> {
    sqlx::query_as::<_, FileEntry>(&format!(
        "UPDATE file_repository SET
            description = $1, file_type = $2, year = $3, student_id = $4, group_id = $5
         WHERE id = $6
         RETURNING {COLUMNS}"
    ))
    .bind(params.description)
    .bind(params.file_type)
    .bind(params.year)
    .bind(params.owner.student_id())
    .bind(params.owner.group_id())
    .bind(id)
    .fetch_one(executor)
    .await
}
