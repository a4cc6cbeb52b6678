use sqlx::PgPool;
use time::{Date, PrimitiveDateTime};

use crate::db::models::Milestone;
use crate::db::types::MilestoneStatus;
use crate::services::ownership::OwnerRef;

const COLUMNS: &str = "\
    id, student_id, group_id, supervisor_id, stage_id, title, status, \
    completion_date, remarks, created_at, updated_at";

pub(crate) struct CreateMilestone<'a> {
    pub owner: OwnerRef,
    pub supervisor_id: i64,
    pub stage_id: i64,
    pub title: &'a str,
    pub status: MilestoneStatus,
    pub completion_date: Option<Date>,
    pub remarks: Option<&'a str>,
    pub created_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateMilestone<'_>,
) -> Result<Milestone, sqlx::Error> {
    sqlx::query_as::<_, Milestone>(&format!(
        "INSERT INTO milestones (
            student_id, group_id, supervisor_id, stage_id, title, status,
            completion_date, remarks, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$9)
         RETURNING {COLUMNS}"
    ))
    .bind(params.owner.student_id())
    .bind(params.owner.group_id())
    .bind(params.supervisor_id)
    .bind(params.stage_id)
    .bind(params.title)
    .bind(params.status)
    .bind(params.completion_date)
    .bind(params.remarks)
    .bind(params.created_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn lock_by_id(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    id: i64,
) -> Result<Option<Milestone>, sqlx::Error> {
    sqlx::query_as::<_, Milestone>(&format!(
        "SELECT {COLUMNS} FROM milestones WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await
}

pub(crate) struct UpdateMilestone {
    pub stage_id: i64,
    pub title: String,
    pub status: MilestoneStatus,
    pub completion_date: Option<Date>,
    pub remarks: Option<String>,
    pub updated_at: PrimitiveDateTime,
}

pub(crate) async fn update(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    id: i64,
    params: UpdateMilestone,
) -> Result<Milestone, sqlx::Error> {
    sqlx::query_as::<_, Milestone>(&format!(
        "UPDATE milestones SET
            stage_id = $1, title = $2, status = $3, completion_date = $4,
            remarks = $5, updated_at = $6
         WHERE id = $7
         RETURNING {COLUMNS}"
    ))
    .bind(params.stage_id)
    .bind(params.title)
    .bind(params.status)
    .bind(params.completion_date)
    .bind(params.remarks)
    .bind(params.updated_at)
    .bind(id)
    .fetch_one(&mut **tx)
    .await
}

pub(crate) async fn list_by_supervisor(
    pool: &PgPool,
    supervisor_id: i64,
    student_id: Option<i64>,
) -> Result<Vec<Milestone>, sqlx::Error> {
    sqlx::query_as::<_, Milestone>(&format!(
        "SELECT {COLUMNS} FROM milestones
         WHERE supervisor_id = $1 AND ($2::bigint IS NULL OR student_id = $2)
         ORDER BY created_at DESC, id DESC"
    ))
    .bind(supervisor_id)
    .bind(student_id)
    .fetch_all(pool)
    .await
}

/// Union of the student's own milestones and those of the student's group.
pub(crate) async fn list_for_student(
    pool: &PgPool,
    student_id: i64,
    group_id: Option<i64>,
) -> Result<Vec<Milestone>, sqlx::Error> {
    sqlx::query_as::<_, Milestone>(&format!(
        "SELECT {COLUMNS} FROM milestones
         WHERE student_id = $1 OR ($2::bigint IS NOT NULL AND group_id = $2)
         ORDER BY created_at DESC, id DESC"
    ))
    .bind(student_id)
    .bind(group_id)
    .fetch_all(pool)
    .await
}
