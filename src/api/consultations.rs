use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentStudent, CurrentSupervisor};
use crate::api::validation::validate_payload;
use crate::core::state::AppState;
use crate::core::time::{parse_rfc3339_utc, primitive_now_utc};
use crate::repositories;
use crate::schemas::progress::{
    ConsultationCreate, ConsultationQuery, ConsultationResponse, ConsultationStatusUpdate,
};
use crate::services::consultations::consultation_transition;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(book_consultation))
        .route("/mine", get(my_consultations))
        .route("/supervised", get(supervised_consultations))
        .route("/:consultation_id", patch(update_consultation_status))
}

async fn book_consultation(
    student: CurrentStudent,
    State(state): State<AppState>,
    Json(payload): Json<ConsultationCreate>,
) -> Result<(StatusCode, Json<ConsultationResponse>), ApiError> {
    validate_payload(&payload)?;
    let proposed_date = parse_rfc3339_utc(&payload.proposed_date).ok_or_else(|| {
        ApiError::BadRequest("proposed_date must be an RFC 3339 timestamp".to_string())
    })?;

    let record = repositories::students::find_by_id(state.db(), student.student_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load student"))?
        .ok_or_else(|| ApiError::NotFound("Student not found".to_string()))?;
    let supervisor_id = record.supervisor_id.ok_or_else(|| {
        ApiError::BadRequest("No supervisor assigned. Consultations cannot be booked yet".to_string())
    })?;

    let consultation = repositories::consultations::create(
        state.db(),
        repositories::consultations::CreateConsultation {
            student_id: record.id,
            supervisor_id,
            topic: payload.topic.trim(),
            proposed_date,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::from_db(e, "Failed to book consultation"))?;

    tracing::info!(
        consultation_id = consultation.id,
        student_id = record.id,
        supervisor_id,
        action = "consultation_book",
        "Consultation booked"
    );

    Ok((StatusCode::CREATED, Json(ConsultationResponse::from_db(consultation))))
}

async fn my_consultations(
    student: CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<Vec<ConsultationResponse>>, ApiError> {
    let consultations =
        repositories::consultations::list_by_student(state.db(), student.student_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list consultations"))?;
    Ok(Json(consultations.into_iter().map(ConsultationResponse::from_db).collect()))
}

async fn supervised_consultations(
    CurrentSupervisor(supervisor_id): CurrentSupervisor,
    State(state): State<AppState>,
    Query(params): Query<ConsultationQuery>,
) -> Result<Json<Vec<ConsultationResponse>>, ApiError> {
    let consultations =
        repositories::consultations::list_by_supervisor(state.db(), supervisor_id, params.status)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list consultations"))?;
    Ok(Json(consultations.into_iter().map(ConsultationResponse::from_db).collect()))
}

async fn update_consultation_status(
    CurrentSupervisor(supervisor_id): CurrentSupervisor,
    State(state): State<AppState>,
    Path(consultation_id): Path<i64>,
    Json(payload): Json<ConsultationStatusUpdate>,
) -> Result<Json<ConsultationResponse>, ApiError> {
    let mut tx =
        state.db().begin().await.map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let consultation = repositories::consultations::lock_by_id(&mut tx, consultation_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load consultation"))?
        .ok_or_else(|| ApiError::NotFound("Consultation not found".to_string()))?;

    if consultation.supervisor_id != supervisor_id {
        return Err(ApiError::Forbidden("You are not the supervisor of this consultation"));
    }

    let next = consultation_transition(consultation.status, payload.status)?;
    let updated =
        repositories::consultations::set_status(&mut tx, consultation.id, next, primitive_now_utc())
            .await
            .map_err(|e| ApiError::internal(e, "Failed to update consultation"))?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit consultation update"))?;

    tracing::info!(
        consultation_id,
        supervisor_id,
        status = ?next,
        action = "consultation_decide",
        "Consultation status updated"
    );

    Ok(Json(ConsultationResponse::from_db(updated)))
}

#[cfg(test)]
mod tests;
