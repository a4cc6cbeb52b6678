use axum::{extract::State, http::StatusCode, routing::get, Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::api::validation::validate_payload;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::communication::{ProjectCreate, ProjectResponse};
use crate::services::access::Role;
use crate::services::ownership::{self, OwnerRef};

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", get(list_projects).post(create_project))
}

async fn create_project(
    CurrentUser(principal): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<ProjectCreate>,
) -> Result<(StatusCode, Json<ProjectResponse>), ApiError> {
    principal.require_staff()?;
    validate_payload(&payload)?;

    let target = OwnerRef::parse(&payload.owner_type, payload.owner_id)?;
    let owner = ownership::resolve(state.db(), target)
        .await
        .map_err(|e| ApiError::from_resolve(e, "Failed to load project owner"))?;
    let supervisor_id = owner.supervisor_id();

    if principal.role == Role::Supervisor && supervisor_id != Some(principal.user_id) {
        return Err(ApiError::Forbidden("You are not the supervisor of this student or group"));
    }

    let description =
        payload.description.as_deref().map(str::trim).filter(|value| !value.is_empty());
    let project = repositories::projects::create(
        state.db(),
        repositories::projects::CreateProject {
            title: payload.title.trim(),
            description,
            owner: target,
            supervisor_id,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::from_db(e, "Failed to create project"))?;

    tracing::info!(
        project_id = project.id,
        user_id = principal.user_id,
        owner_type = target.kind().as_str(),
        owner_id = target.id(),
        action = "project_create",
        "Project recorded"
    );

    let owner_name = owner.display_name().to_string();
    Ok((StatusCode::CREATED, Json(ProjectResponse::from_db(project, Some(owner_name)))))
}

async fn list_projects(
    CurrentUser(principal): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectResponse>>, ApiError> {
    let projects = match principal.role {
        Role::Admin => repositories::projects::list_all(state.db()).await,
        Role::Supervisor => {
            repositories::projects::list_by_supervisor(state.db(), principal.user_id).await
        }
        Role::Student { student_id } => {
            let group = repositories::groups::find_for_student(state.db(), student_id)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to load group"))?;
            repositories::projects::list_for_student(
                state.db(),
                student_id,
                group.map(|group| group.id),
            )
            .await
        }
        Role::Unassigned => return Err(ApiError::Forbidden("User has no role assigned")),
    }
    .map_err(|e| ApiError::internal(e, "Failed to list projects"))?;

    let refs: Vec<OwnerRef> = projects
        .iter()
        .map(|project| OwnerRef::from_parts(project.owner_kind, project.owner_id))
        .collect();
    let names = ownership::display_names(state.db(), &refs)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load project owners"))?;

    Ok(Json(
        projects
            .into_iter()
            .zip(refs)
            .map(|(project, owner)| ProjectResponse::from_db(project, names.get(&owner).cloned()))
            .collect(),
    ))
}
