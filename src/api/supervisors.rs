use axum::{extract::State, http::StatusCode, routing::get, Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentAdmin, CurrentSupervisor, CurrentUser};
use crate::api::validation::validate_payload;
use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::group::GroupResponse;
use crate::schemas::student::StudentResponse;
use crate::schemas::user::{SupervisorCreate, SupervisorResponse};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_supervisors).post(create_supervisor))
        .route("/me/students", get(assigned_students))
        .route("/me/groups", get(assigned_groups))
}

async fn list_supervisors(
    CurrentUser(_principal): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<SupervisorResponse>>, ApiError> {
    let supervisors = repositories::users::list_by_role(state.db(), UserRole::Supervisor)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list supervisors"))?;
    Ok(Json(supervisors.into_iter().map(SupervisorResponse::from_db).collect()))
}

async fn create_supervisor(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<SupervisorCreate>,
) -> Result<(StatusCode, Json<SupervisorResponse>), ApiError> {
    validate_payload(&payload)?;

    let username = payload.username.trim();
    let email = payload.email.trim();
    let existing =
        repositories::users::exists_by_username_or_email(state.db(), username, Some(email))
            .await
            .map_err(|e| ApiError::internal(e, "Failed to check existing user"))?;
    if existing {
        return Err(ApiError::Conflict("Username or email already exists".to_string()));
    }

    let hashed_password = security::hash_password(&payload.password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;

    let user = repositories::users::create(
        state.db(),
        repositories::users::CreateUser {
            username,
            email: Some(email),
            full_name: payload.full_name.trim(),
            hashed_password,
            role: Some(UserRole::Supervisor),
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::from_db(e, "Failed to create supervisor"))?;

    tracing::info!(
        admin_id = admin.user_id,
        supervisor_id = user.id,
        action = "supervisor_create",
        "Admin created supervisor"
    );

    Ok((StatusCode::CREATED, Json(SupervisorResponse::from_db(user))))
}

async fn assigned_students(
    CurrentSupervisor(supervisor_id): CurrentSupervisor,
    State(state): State<AppState>,
) -> Result<Json<Vec<StudentResponse>>, ApiError> {
    let students = repositories::students::list_by_supervisor(state.db(), supervisor_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list assigned students"))?;
    Ok(Json(students.into_iter().map(StudentResponse::from_db).collect()))
}

async fn assigned_groups(
    CurrentSupervisor(supervisor_id): CurrentSupervisor,
    State(state): State<AppState>,
) -> Result<Json<Vec<GroupResponse>>, ApiError> {
    let groups = repositories::groups::list_by_supervisor(state.db(), supervisor_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list assigned groups"))?;

    let mut response = Vec::with_capacity(groups.len());
    for group in groups {
        let members = repositories::groups::members(state.db(), group.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load group members"))?;
        response.push(
            GroupResponse::from_db(group)
                .with_members(members.into_iter().map(StudentResponse::from_db).collect()),
        );
    }

    Ok(Json(response))
}
