use axum::{extract::State, http::StatusCode, routing::get, Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentAdmin, CurrentStudent, CurrentSupervisor};
use crate::api::validation::validate_payload;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::Announcement;
use crate::repositories;
use crate::repositories::announcements::Author;
use crate::schemas::communication::{AnnouncementCreate, AnnouncementResponse};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/supervisor", get(list_supervisor_announcements).post(create_supervisor_announcement))
        .route("/admin", get(list_admin_announcements).post(create_admin_announcement))
        .route("/student-feed", get(student_feed))
        .route("/supervisor-feed", get(supervisor_feed))
}

fn respond(announcements: Vec<Announcement>) -> Json<Vec<AnnouncementResponse>> {
    Json(announcements.into_iter().map(AnnouncementResponse::from_db).collect())
}

async fn publish(
    state: &AppState,
    author: Author,
    payload: AnnouncementCreate,
) -> Result<(StatusCode, Json<AnnouncementResponse>), ApiError> {
    validate_payload(&payload)?;

    let announcement = repositories::announcements::create(
        state.db(),
        repositories::announcements::CreateAnnouncement {
            author,
            title: payload.title.trim(),
            content: payload.content.trim(),
            target_group: payload.target_group,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::from_db(e, "Failed to create announcement"))?;

    tracing::info!(
        announcement_id = announcement.id,
        author = ?author,
        target_group = ?announcement.target_group,
        action = "announcement_create",
        "Announcement published"
    );

    Ok((StatusCode::CREATED, Json(AnnouncementResponse::from_db(announcement))))
}

async fn create_supervisor_announcement(
    CurrentSupervisor(supervisor_id): CurrentSupervisor,
    State(state): State<AppState>,
    Json(payload): Json<AnnouncementCreate>,
) -> Result<(StatusCode, Json<AnnouncementResponse>), ApiError> {
    publish(&state, Author::Supervisor(supervisor_id), payload).await
}

async fn create_admin_announcement(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<AnnouncementCreate>,
) -> Result<(StatusCode, Json<AnnouncementResponse>), ApiError> {
    publish(&state, Author::Admin(admin.user_id), payload).await
}

async fn list_supervisor_announcements(
    CurrentSupervisor(supervisor_id): CurrentSupervisor,
    State(state): State<AppState>,
) -> Result<Json<Vec<AnnouncementResponse>>, ApiError> {
    let announcements =
        repositories::announcements::list_by_author(state.db(), Author::Supervisor(supervisor_id))
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list announcements"))?;
    Ok(respond(announcements))
}

async fn list_admin_announcements(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<AnnouncementResponse>>, ApiError> {
    let announcements =
        repositories::announcements::list_by_author(state.db(), Author::Admin(admin.user_id))
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list announcements"))?;
    Ok(respond(announcements))
}

/// Own supervisor, group supervisor and admin posts for students, each row once.
async fn student_feed(
    student: CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<Vec<AnnouncementResponse>>, ApiError> {
    let record = repositories::students::find_by_id(state.db(), student.student_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load student"))?
        .ok_or_else(|| ApiError::NotFound("Student not found".to_string()))?;
    let group = repositories::groups::find_for_student(state.db(), student.student_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load group"))?;

    let mut supervisor_ids: Vec<i64> = record
        .supervisor_id
        .into_iter()
        .chain(group.and_then(|group| group.supervisor_id))
        .collect();
    supervisor_ids.sort_unstable();
    supervisor_ids.dedup();

    let announcements = repositories::announcements::student_feed(state.db(), &supervisor_ids)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load announcements"))?;
    Ok(respond(announcements))
}

async fn supervisor_feed(
    CurrentSupervisor(_supervisor_id): CurrentSupervisor,
    State(state): State<AppState>,
) -> Result<Json<Vec<AnnouncementResponse>>, ApiError> {
    let announcements = repositories::announcements::supervisor_feed(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load announcements"))?;
    Ok(respond(announcements))
}
