use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentStudent, CurrentSupervisor};
use crate::api::validation::validate_payload;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::MilestoneStatus;
use crate::repositories;
use crate::schemas::progress::{MilestoneCreate, MilestoneQuery, MilestoneResponse, MilestoneUpdate};
use crate::services::milestones::{
    ensure_creator, ensure_group_supervisor, parse_completion_date, parse_status,
};
use crate::services::ownership::{self, Owner, OwnerRef};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_milestones).post(create_milestone))
        .route("/mine", get(my_milestones))
        .route("/:milestone_id", patch(update_milestone).put(update_milestone))
}

async fn ensure_stage(executor: impl sqlx::PgExecutor<'_>, stage_id: i64) -> Result<(), ApiError> {
    let exists = repositories::stages::exists(executor, stage_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check stage"))?;
    if exists {
        Ok(())
    } else {
        Err(ApiError::BadRequest("Invalid stage ID".to_string()))
    }
}

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

async fn create_milestone(
    CurrentSupervisor(supervisor_id): CurrentSupervisor,
    State(state): State<AppState>,
    Json(payload): Json<MilestoneCreate>,
) -> Result<(StatusCode, Json<MilestoneResponse>), ApiError> {
    validate_payload(&payload)?;

    let target = OwnerRef::exclusive(payload.student_id, payload.group_id)?;
    let status = match payload.status.as_deref() {
        Some(raw) => parse_status(raw)?,
        None => MilestoneStatus::Pending,
    };
    let completion_date = parse_completion_date(payload.completion_date.as_deref())?;

    let owner = ownership::resolve(state.db(), target)
        .await
        .map_err(|e| ApiError::from_resolve(e, "Failed to load milestone target"))?;
    if let Owner::Group(group) = &owner {
        ensure_group_supervisor(group, supervisor_id)?;
    }
    ensure_stage(state.db(), payload.stage_id).await?;

    let milestone = repositories::milestones::create(
        state.db(),
        repositories::milestones::CreateMilestone {
            owner: target,
            supervisor_id,
            stage_id: payload.stage_id,
            title: payload.title.trim(),
            status,
            completion_date,
            remarks: trimmed(payload.remarks.as_deref()),
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::from_db(e, "Failed to create milestone"))?;

    tracing::info!(
        milestone_id = milestone.id,
        supervisor_id,
        owner_type = target.kind().as_str(),
        owner_id = target.id(),
        action = "milestone_create",
        "Milestone created"
    );

    Ok((StatusCode::CREATED, Json(MilestoneResponse::from_db(milestone))))
}

async fn update_milestone(
    CurrentSupervisor(supervisor_id): CurrentSupervisor,
    State(state): State<AppState>,
    Path(milestone_id): Path<i64>,
    Json(payload): Json<MilestoneUpdate>,
) -> Result<Json<MilestoneResponse>, ApiError> {
    validate_payload(&payload)?;

    let mut tx =
        state.db().begin().await.map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let current = repositories::milestones::lock_by_id(&mut tx, milestone_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load milestone"))?
        .ok_or_else(|| ApiError::NotFound("Milestone not found".to_string()))?;
    ensure_creator(&current, supervisor_id)?;

    let status = match payload.status.as_deref() {
        Some(raw) => parse_status(raw)?,
        None => current.status,
    };
    let completion_date = match payload.completion_date.as_deref() {
        Some(raw) => parse_completion_date(Some(raw))?,
        None => current.completion_date,
    };
    let stage_id = match payload.stage_id {
        Some(stage_id) if stage_id != current.stage_id => {
            ensure_stage(&mut *tx, stage_id).await?;
            stage_id
        }
        _ => current.stage_id,
    };
    let title = match payload.title.as_deref() {
        Some(title) => title.trim().to_string(),
        None => current.title,
    };
    let remarks = match payload.remarks.as_deref() {
        Some(remarks) => trimmed(Some(remarks)).map(str::to_string),
        None => current.remarks,
    };

    let milestone = repositories::milestones::update(
        &mut tx,
        milestone_id,
        repositories::milestones::UpdateMilestone {
            stage_id,
            title,
            status,
            completion_date,
            remarks,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::from_db(e, "Failed to update milestone"))?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit milestone update"))?;

    tracing::info!(milestone_id, supervisor_id, status = ?status, action = "milestone_update", "Milestone updated");

    Ok(Json(MilestoneResponse::from_db(milestone)))
}

async fn list_milestones(
    CurrentSupervisor(supervisor_id): CurrentSupervisor,
    State(state): State<AppState>,
    Query(params): Query<MilestoneQuery>,
) -> Result<Json<Vec<MilestoneResponse>>, ApiError> {
    let milestones =
        repositories::milestones::list_by_supervisor(state.db(), supervisor_id, params.student_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list milestones"))?;
    Ok(Json(milestones.into_iter().map(MilestoneResponse::from_db).collect()))
}

async fn my_milestones(
    student: CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<Vec<MilestoneResponse>>, ApiError> {
    let group = repositories::groups::find_for_student(state.db(), student.student_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load group"))?;
    let milestones = repositories::milestones::list_for_student(
        state.db(),
        student.student_id,
        group.map(|group| group.id),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to list milestones"))?;
    Ok(Json(milestones.into_iter().map(MilestoneResponse::from_db).collect()))
}

#[cfg(test)]
mod tests;
