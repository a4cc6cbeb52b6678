use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Announcement;
use crate::db::types::Audience;

const COLUMNS: &str = "id, supervisor_id, admin_id, title, content, target_group, created_at";

#[derive(Debug, Clone, Copy)]
pub(crate) enum Author {
    Supervisor(i64),
    Admin(i64),
}

pub(crate) struct CreateAnnouncement<'a> {
    pub author: Author,
    pub title: &'a str,
    pub content: &'a str,
    pub target_group: Audience,
    pub created_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateAnnouncement<'_>,
) -> Result<Announcement, sqlx::Error> {
    let (supervisor_id, admin_id) = match params.author {
        Author::Supervisor(id) => (Some(id), None),
        Author::Admin(id) => (None, Some(id)),
    };

    sqlx::query_as::<_, Announcement>(&format!(
        "INSERT INTO announcements (supervisor_id, admin_id, title, content, target_group, created_at)
         VALUES ($1,$2,$3,$4,$5,$6)
         RETURNING {COLUMNS}"
    ))
    .bind(supervisor_id)
    .bind(admin_id)
    .bind(params.title)
    .bind(params.content)
    .bind(params.target_group)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn list_by_author(
    pool: &PgPool,
    author: Author,
) -> Result<Vec<Announcement>, sqlx::Error> {
    let column = match author {
        Author::Supervisor(_) => "supervisor_id",
        Author::Admin(_) => "admin_id",
    };
    let id = match author {
        Author::Supervisor(id) | Author::Admin(id) => id,
    };

    sqlx::query_as::<_, Announcement>(&format!(
        "SELECT {COLUMNS} FROM announcements WHERE {column} = $1 ORDER BY created_at DESC, id DESC"
    ))
    .bind(id)
    .fetch_all(pool)
    .await
}

/// Posts aimed at students, either by one of `supervisor_ids` or by an admin.
pub(crate) async fn student_feed(
    pool: &PgPool,
    supervisor_ids: &[i64],
) -> Result<Vec<Announcement>, sqlx::Error> {
    sqlx::query_as::<_, Announcement>(&format!(
        "SELECT {COLUMNS} FROM announcements
         WHERE target_group = $2
           AND (supervisor_id = ANY($1) OR admin_id IS NOT NULL)
         ORDER BY created_at DESC, id DESC"
    ))
    .bind(supervisor_ids)
    .bind(Audience::Students)
    .fetch_all(pool)
    .await
}

pub(crate) async fn supervisor_feed(pool: &PgPool) -> Result<Vec<Announcement>, sqlx::Error> {
    sqlx::query_as::<_, Announcement>(&format!(
        "SELECT {COLUMNS} FROM announcements
         WHERE target_group = $1
         ORDER BY created_at DESC, id DESC"
    ))
    .bind(Audience::Supervisors)
    .fetch_all(pool)
    .await
}
