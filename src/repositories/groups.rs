use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::{ProjectGroup, Student};
use crate::db::types::OwnerKind;

const COLUMNS: &str =
    "id, name, course_id, year_id, project_title, leader_id, supervisor_id, created_at";

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: i64,
) -> Result<Option<ProjectGroup>, sqlx::Error> {
    sqlx::query_as::<_, ProjectGroup>(&format!("SELECT {COLUMNS} FROM project_groups WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn lock_by_id(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    id: i64,
) -> Result<Option<ProjectGroup>, sqlx::Error> {
    sqlx::query_as::<_, ProjectGroup>(&format!(
        "SELECT {COLUMNS} FROM project_groups WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await
}

pub(crate) async fn names_by_ids(
    pool: &PgPool,
    ids: &[i64],
) -> Result<Vec<(i64, String)>, sqlx::Error> {
    sqlx::query_as::<_, (i64, String)>("SELECT id, name FROM project_groups WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await
}

pub(crate) async fn list(pool: &PgPool) -> Result<Vec<ProjectGroup>, sqlx::Error> {
    sqlx::query_as::<_, ProjectGroup>(&format!(
        "SELECT {COLUMNS} FROM project_groups ORDER BY created_at, id"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_by_supervisor(
    pool: &PgPool,
    supervisor_id: i64,
) -> Result<Vec<ProjectGroup>, sqlx::Error> {
    sqlx::query_as::<_, ProjectGroup>(&format!(
        "SELECT {COLUMNS} FROM project_groups WHERE supervisor_id = $1 ORDER BY name, id"
    ))
    .bind(supervisor_id)
    .fetch_all(pool)
    .await
}

/// A student's group. The earliest created one wins if the data ever holds more.
pub(crate) async fn find_for_student(
    executor: impl sqlx::PgExecutor<'_>,
    student_id: i64,
) -> Result<Option<ProjectGroup>, sqlx::Error> {
    sqlx::query_as::<_, ProjectGroup>(&format!(
        "SELECT {COLUMNS} FROM project_groups
         WHERE id IN (SELECT group_id FROM project_group_members WHERE student_id = $1)
         ORDER BY created_at, id
         LIMIT 1"
    ))
    .bind(student_id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn is_grouped(
    executor: impl sqlx::PgExecutor<'_>,
    student_id: i64,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM project_group_members WHERE student_id = $1)",
    )
    .bind(student_id)
    .fetch_one(executor)
    .await
}

pub(crate) async fn member_ids(
    executor: impl sqlx::PgExecutor<'_>,
    group_id: i64,
) -> Result<Vec<i64>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT student_id FROM project_group_members WHERE group_id = $1 ORDER BY student_id",
    )
    .bind(group_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn members(pool: &PgPool, group_id: i64) -> Result<Vec<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(
        "SELECT s.id, s.user_id, s.reg_number, s.full_name, s.project_title, s.supervisor_id,
                s.course_id, s.year_id, s.created_at
         FROM students s
         JOIN project_group_members m ON m.student_id = s.id
         WHERE m.group_id = $1
         ORDER BY s.reg_number",
    )
    .bind(group_id)
    .fetch_all(pool)
    .await
}

/// Reg numbers of the given students that already belong to a group other than `except`.
pub(crate) async fn taken_reg_numbers(
    executor: impl sqlx::PgExecutor<'_>,
    student_ids: &[i64],
    except_group: Option<i64>,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT DISTINCT s.reg_number
         FROM project_group_members m
         JOIN students s ON s.id = m.student_id
         WHERE m.student_id = ANY($1) AND ($2::bigint IS NULL OR m.group_id <> $2)
         ORDER BY s.reg_number",
    )
    .bind(student_ids)
    .bind(except_group)
    .fetch_all(executor)
    .await
}

pub(crate) struct CreateGroup<'a> {
    pub name: &'a str,
    pub course_id: i64,
    pub year_id: i64,
    pub project_title: Option<&'a str>,
    pub created_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    params: CreateGroup<'_>,
    member_ids: &[i64],
) -> Result<ProjectGroup, sqlx::Error> {
    let group = sqlx::query_as::<_, ProjectGroup>(&format!(
        "INSERT INTO project_groups (name, course_id, year_id, project_title, created_at)
         VALUES ($1,$2,$3,$4,$5)
         RETURNING {COLUMNS}"
    ))
    .bind(params.name)
    .bind(params.course_id)
    .bind(params.year_id)
    .bind(params.project_title)
    .bind(params.created_at)
    .fetch_one(&mut **tx)
    .await?;

    add_members(tx, group.id, member_ids, params.created_at).await?;
    Ok(group)
}

async fn add_members(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    group_id: i64,
    member_ids: &[i64],
    added_at: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    if member_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        "INSERT INTO project_group_members (group_id, student_id, added_at)
         SELECT $1, student_id, $3 FROM UNNEST($2::bigint[]) AS student_id
         ON CONFLICT DO NOTHING",
    )
    .bind(group_id)
    .bind(member_ids)
    .bind(added_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub(crate) async fn replace_members(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    group_id: i64,
    member_ids: &[i64],
    added_at: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM project_group_members WHERE group_id = $1 AND NOT (student_id = ANY($2))")
        .bind(group_id)
        .bind(member_ids)
        .execute(&mut **tx)
        .await?;

    add_members(tx, group_id, member_ids, added_at).await
}

pub(crate) struct UpdateGroup {
    pub name: String,
    pub project_title: Option<String>,
    pub leader_id: Option<i64>,
}

pub(crate) async fn update(
    executor: impl sqlx::PgExecutor<'_>,
    id: i64,
    params: UpdateGroup,
) -> Result<ProjectGroup, sqlx::Error> {
    sqlx::query_as::<_, ProjectGroup>(&format!(
        "UPDATE project_groups SET name = $1, project_title = $2, leader_id = $3
         WHERE id = $4
         RETURNING {COLUMNS}"
    ))
    .bind(params.name)
    .bind(params.project_title)
    .bind(params.leader_id)
    .bind(id)
    .fetch_one(executor)
    .await
}

pub(crate) async fn set_leader(
    executor: impl sqlx::PgExecutor<'_>,
    id: i64,
    leader_id: i64,
) -> Result<ProjectGroup, sqlx::Error> {
    sqlx::query_as::<_, ProjectGroup>(&format!(
        "UPDATE project_groups SET leader_id = $1 WHERE id = $2 RETURNING {COLUMNS}"
    ))
    .bind(leader_id)
    .bind(id)
    .fetch_one(executor)
    .await
}

pub(crate) async fn set_project_title(
    executor: impl sqlx::PgExecutor<'_>,
    id: i64,
    title: &str,
) -> Result<ProjectGroup, sqlx::Error> {
    sqlx::query_as::<_, ProjectGroup>(&format!(
        "UPDATE project_groups SET project_title = $1 WHERE id = $2 RETURNING {COLUMNS}"
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
) -> Result<ProjectGroup, sqlx::Error> {
    sqlx::query_as::<_, ProjectGroup>(&format!(
        "UPDATE project_groups SET supervisor_id = $1 WHERE id = $2 RETURNING {COLUMNS}"
    ))
    .bind(supervisor_id)
    .bind(id)
    .fetch_one(executor)
    .await
}

/// Removes the group and everything it owns through an owner reference.
/// Members, milestones and repository entries go with the foreign keys.
pub(crate) async fn delete(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    id: i64,
) -> Result<bool, sqlx::Error> {
    for table in ["documents", "feedback", "projects"] {
        sqlx::query(&format!("DELETE FROM {table} WHERE owner_kind = $1 AND owner_id = $2"))
            .bind(OwnerKind::Group)
            .bind(id)
            .execute(&mut **tx)
            .await?;
    }

    let result =
        sqlx::query("DELETE FROM project_groups WHERE id = $1").bind(id).execute(&mut **tx).await?;
    Ok(result.rows_affected() > 0)
}
