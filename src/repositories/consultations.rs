use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Consultation;
use crate::db::types::ConsultationStatus;

const COLUMNS: &str =
    "id, student_id, supervisor_id, topic, proposed_date, status, created_at, updated_at";

pub(crate) struct CreateConsultation<'a> {
    pub student_id: i64,
    pub supervisor_id: i64,
    pub topic: &'a str,
    pub proposed_date: PrimitiveDateTime,
    pub created_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateConsultation<'_>,
) -> Result<Consultation, sqlx::Error> {
    sqlx::query_as::<_, Consultation>(&format!(
        "INSERT INTO consultations (
            student_id, supervisor_id, topic, proposed_date, status, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$6)
         RETURNING {COLUMNS}"
    ))
    .bind(params.student_id)
    .bind(params.supervisor_id)
    .bind(params.topic)
    .bind(params.proposed_date)
    .bind(ConsultationStatus::Pending)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn lock_by_id(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    id: i64,
) -> Result<Option<Consultation>, sqlx::Error> {
    sqlx::query_as::<_, Consultation>(&format!(
        "SELECT {COLUMNS} FROM consultations WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await
}

pub(crate) async fn set_status(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    id: i64,
    status: ConsultationStatus,
    updated_at: PrimitiveDateTime,
) -> Result<Consultation, sqlx::Error> {
    sqlx::query_as::<_, Consultation>(&format!(
        "UPDATE consultations SET status = $1, updated_at = $2 WHERE id = $3 RETURNING {COLUMNS}"
    ))
    .bind(status)
    .bind(updated_at)
    .bind(id)
    .fetch_one(&mut **tx)
    .await
}

pub(crate) async fn list_by_student(
    pool: &PgPool,
    student_id: i64,
) -> Result<Vec<Consultation>, sqlx::Error> {
    sqlx::query_as::<_, Consultation>(&format!(
        "SELECT {COLUMNS} FROM consultations WHERE student_id = $1 ORDER BY proposed_date DESC, id DESC"
    ))
    .bind(student_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_by_supervisor(
    pool: &PgPool,
    supervisor_id: i64,
    status: Option<ConsultationStatus>,
) -> Result<Vec<Consultation>, sqlx::Error> {
    sqlx::query_as::<_, Consultation>(&format!(
        "SELECT {COLUMNS} FROM consultations
         WHERE supervisor_id = $1 AND ($2::consultationstatus IS NULL OR status = $2)
         ORDER BY proposed_date DESC, id DESC"
    ))
    .bind(supervisor_id)
    .bind(status)
    .fetch_all(pool)
    .await
}
