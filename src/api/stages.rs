use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentAdmin, CurrentUser};
use crate::api::validation::validate_payload;
use crate::core::state::AppState;
use crate::db::models::Stage;
use crate::repositories;
use crate::schemas::academic::StageCreate;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_stages).post(create_stage))
        .route("/:stage_id", delete(delete_stage))
}

async fn list_stages(
    CurrentUser(_principal): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Stage>>, ApiError> {
    let stages = repositories::stages::list(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list stages"))?;
    Ok(Json(stages))
}

async fn create_stage(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<StageCreate>,
) -> Result<(StatusCode, Json<Stage>), ApiError> {
    validate_payload(&payload)?;
    let description =
        payload.description.as_deref().map(str::trim).filter(|value| !value.is_empty());

    let stage = repositories::stages::create(state.db(), payload.name.trim(), description)
        .await
        .map_err(|e| ApiError::from_db(e, "Failed to create stage"))?;

    tracing::info!(admin_id = admin.user_id, stage_id = stage.id, action = "stage_create", "Stage created");
    Ok((StatusCode::CREATED, Json(stage)))
}

async fn delete_stage(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(stage_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let deleted = repositories::stages::delete(state.db(), stage_id)
        .await
        .map_err(|e| ApiError::from_db(e, "Failed to delete stage"))?;
    if !deleted {
        return Err(ApiError::NotFound("Stage not found".to_string()));
    }

    tracing::info!(admin_id = admin.user_id, stage_id, action = "stage_delete", "Stage deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests;
