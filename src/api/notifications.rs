use axum::{
    extract::{Path, Query, State},
    routing::{get, patch, post},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::api::pagination::{PageQuery, PaginatedResponse};
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::communication::{
    MarkAllReadResponse, NotificationQuery, NotificationResponse, NotificationUpdate,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/read-all", post(mark_all_read))
        .route("/:notification_id", patch(update_notification))
}

async fn list_notifications(
    CurrentUser(principal): CurrentUser,
    State(state): State<AppState>,
    Query(params): Query<NotificationQuery>,
) -> Result<Json<PaginatedResponse<NotificationResponse>>, ApiError> {
    let page = PageQuery { skip: params.skip, limit: params.limit }.normalized();

    let items = repositories::notifications::list(
        state.db(),
        principal.user_id,
        params.unread_only,
        page.skip,
        page.limit,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to list notifications"))?;
    let total_count =
        repositories::notifications::count(state.db(), principal.user_id, params.unread_only)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to count notifications"))?;

    Ok(Json(PaginatedResponse {
        items: items.into_iter().map(NotificationResponse::from_db).collect(),
        total_count,
        skip: page.skip,
        limit: page.limit,
    }))
}

async fn update_notification(
    CurrentUser(principal): CurrentUser,
    State(state): State<AppState>,
    Path(notification_id): Path<i64>,
    Json(payload): Json<NotificationUpdate>,
) -> Result<Json<NotificationResponse>, ApiError> {
    let notification = repositories::notifications::set_read(
        state.db(),
        notification_id,
        principal.user_id,
        payload.is_read,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update notification"))?
    .ok_or_else(|| ApiError::NotFound("Notification not found".to_string()))?;

    Ok(Json(NotificationResponse::from_db(notification)))
}

async fn mark_all_read(
    CurrentUser(principal): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<MarkAllReadResponse>, ApiError> {
    let updated = repositories::notifications::mark_all_read(state.db(), principal.user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to update notifications"))?;

    tracing::debug!(user_id = principal.user_id, updated, "Notifications marked read");
    Ok(Json(MarkAllReadResponse { updated }))
}
