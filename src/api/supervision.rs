use axum::{extract::State, routing::post, Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentAdmin;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::group::{AssignmentResponse, GroupAssignmentRequest, StudentAssignmentRequest};
use crate::services::notifications;
use crate::services::supervision::{self, AssignmentDecision, AssignmentMode};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/students", post(assign_student_supervisor))
        .route("/groups", post(assign_group_supervisor))
}

fn record_decision(target: &'static str, decision: AssignmentDecision) {
    let label = match decision {
        AssignmentDecision::Assign { previous: None } => "assigned",
        AssignmentDecision::Assign { previous: Some(_) } => "reassigned",
        AssignmentDecision::Unchanged => "unchanged",
        AssignmentDecision::ConflictDetected { .. } => "confirmation_required",
    };
    metrics::counter!("supervisor_assignments_total", "target" => target, "decision" => label)
        .increment(1);
}

fn previous_of(decision: AssignmentDecision, requested: i64) -> Option<i64> {
    match decision {
        AssignmentDecision::Assign { previous } => previous,
        AssignmentDecision::Unchanged => Some(requested),
        AssignmentDecision::ConflictDetected { current } => Some(current),
    }
}

async fn assign_student_supervisor(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<StudentAssignmentRequest>,
) -> Result<Json<AssignmentResponse>, ApiError> {
    let mode = AssignmentMode::from_force(payload.force);

    let mut tx =
        state.db().begin().await.map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let student = repositories::students::lock_by_reg_number(&mut tx, &payload.reg_number)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to lock student"))?
        .ok_or_else(|| ApiError::NotFound("Student not found or already in a group".to_string()))?;

    let is_grouped = repositories::groups::is_grouped(&mut *tx, student.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check group membership"))?;
    supervision::ensure_assignable_student(is_grouped)?;

    let supervisor = repositories::users::find_supervisor(&mut *tx, payload.supervisor_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load supervisor"))?
        .ok_or_else(|| ApiError::NotFound("Supervisor not found".to_string()))?;

    let decision = supervision::decide(student.supervisor_id, supervisor.id, mode);
    record_decision("student", decision);
    let decision = decision.into_result("Student")?;

    let student = if decision.changes_supervisor() {
        repositories::students::set_supervisor(&mut *tx, student.id, supervisor.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to assign supervisor"))?
    } else {
        student
    };

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit assignment"))?;

    tracing::info!(
        admin_id = admin.user_id,
        student_id = student.id,
        supervisor_id = supervisor.id,
        changed = decision.changes_supervisor(),
        action = "student_supervisor_assign",
        "Supervisor assignment processed"
    );

    if decision.changes_supervisor() {
        notifications::dispatch(&state, vec![notifications::student_assigned(&supervisor, &student)])
            .await;
    }

    Ok(Json(AssignmentResponse {
        message: if decision.changes_supervisor() {
            format!("Supervisor {} assigned to {}", supervisor.username, student.reg_number)
        } else {
            format!("{} already has this supervisor", student.reg_number)
        },
        changed: decision.changes_supervisor(),
        previous_supervisor_id: previous_of(decision, supervisor.id),
        supervisor_id: supervisor.id,
    }))
}

async fn assign_group_supervisor(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<GroupAssignmentRequest>,
) -> Result<Json<AssignmentResponse>, ApiError> {
    let mode = AssignmentMode::from_force(payload.force);

    let mut tx =
        state.db().begin().await.map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let group = repositories::groups::lock_by_id(&mut tx, payload.group_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to lock group"))?
        .ok_or_else(|| ApiError::NotFound("Group not found".to_string()))?;

    let supervisor = repositories::users::find_supervisor(&mut *tx, payload.supervisor_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load supervisor"))?
        .ok_or_else(|| ApiError::NotFound("Supervisor not found".to_string()))?;

    let decision = supervision::decide(group.supervisor_id, supervisor.id, mode);
    record_decision("group", decision);
    let decision = decision.into_result("Group")?;

    let group = if decision.changes_supervisor() {
        repositories::groups::set_supervisor(&mut *tx, group.id, supervisor.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to assign supervisor"))?
    } else {
        group
    };

    let member_count = repositories::groups::member_ids(&mut *tx, group.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load group members"))?
        .len();

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit assignment"))?;

    tracing::info!(
        admin_id = admin.user_id,
        group_id = group.id,
        supervisor_id = supervisor.id,
        changed = decision.changes_supervisor(),
        action = "group_supervisor_assign",
        "Supervisor assignment processed"
    );

    if decision.changes_supervisor() {
        notifications::dispatch(
            &state,
            vec![notifications::group_assigned(&supervisor, &group, member_count)],
        )
        .await;
    }

    Ok(Json(AssignmentResponse {
        message: if decision.changes_supervisor() {
            format!("Supervisor {} assigned to {}", supervisor.username, group.name)
        } else {
            format!("{} already has this supervisor", group.name)
        },
        changed: decision.changes_supervisor(),
        previous_supervisor_id: previous_of(decision, supervisor.id),
        supervisor_id: supervisor.id,
    }))
}

#[cfg(test)]
mod tests;
