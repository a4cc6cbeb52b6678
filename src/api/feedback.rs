use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentStudent, CurrentSupervisor};
use crate::api::validation::validate_payload;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::Feedback;
use crate::repositories;
use crate::schemas::communication::{FeedbackCreate, FeedbackResponse};
use crate::services::ownership::{self, OwnerRef};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(give_feedback))
        .route("/given", get(given_feedback))
        .route("/mine", get(my_feedback))
}

async fn give_feedback(
    CurrentSupervisor(supervisor_id): CurrentSupervisor,
    State(state): State<AppState>,
    Json(payload): Json<FeedbackCreate>,
) -> Result<(StatusCode, Json<FeedbackResponse>), ApiError> {
    validate_payload(&payload)?;

    let target = OwnerRef::parse(&payload.owner_type, payload.owner_id)?;
    let owner = ownership::resolve(state.db(), target)
        .await
        .map_err(|e| ApiError::from_resolve(e, "Failed to load feedback target"))?;
    if owner.supervisor_id() != Some(supervisor_id) {
        return Err(ApiError::Forbidden("You are not the supervisor of this student or group"));
    }

    let feedback = repositories::feedback::create(
        state.db(),
        target,
        supervisor_id,
        payload.content.trim(),
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::from_db(e, "Failed to store feedback"))?;

    tracing::info!(
        feedback_id = feedback.id,
        supervisor_id,
        owner_type = target.kind().as_str(),
        owner_id = target.id(),
        action = "feedback_give",
        "Feedback given"
    );

    let owner_name = owner.display_name().to_string();
    Ok((StatusCode::CREATED, Json(FeedbackResponse::from_db(feedback, Some(owner_name)))))
}

async fn named(state: &AppState, entries: Vec<Feedback>) -> Result<Vec<FeedbackResponse>, ApiError> {
    let refs: Vec<OwnerRef> =
        entries.iter().map(|entry| OwnerRef::from_parts(entry.owner_kind, entry.owner_id)).collect();
    let names = ownership::display_names(state.db(), &refs)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load feedback owners"))?;

    Ok(entries
        .into_iter()
        .zip(refs)
        .map(|(entry, owner)| FeedbackResponse::from_db(entry, names.get(&owner).cloned()))
        .collect())
}

async fn given_feedback(
    CurrentSupervisor(supervisor_id): CurrentSupervisor,
    State(state): State<AppState>,
) -> Result<Json<Vec<FeedbackResponse>>, ApiError> {
    let entries = repositories::feedback::list_by_supervisor(state.db(), supervisor_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list feedback"))?;
    Ok(Json(named(&state, entries).await?))
}

async fn my_feedback(
    student: CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<Vec<FeedbackResponse>>, ApiError> {
    let group = repositories::groups::find_for_student(state.db(), student.student_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load group"))?;
    let entries = repositories::feedback::list_for_student(
        state.db(),
        student.student_id,
        group.map(|group| group.id),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to list feedback"))?;
    Ok(Json(named(&state, entries).await?))
}

#[cfg(test)]
mod tests;
