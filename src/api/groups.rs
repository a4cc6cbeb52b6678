use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentAdmin, CurrentStudent, CurrentUser};
use crate::api::validation::validate_payload;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::ProjectGroup;
use crate::repositories;
use crate::schemas::group::{
    AutoPartitionRequest, AutoPartitionResponse, GroupCreate, GroupResponse, GroupUpdate,
    LeaderRequest,
};
use crate::schemas::student::{StudentResponse, TitleRequest};
use crate::services::grouping;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_groups).post(create_group))
        .route("/auto", post(auto_partition))
        .route("/mine", get(my_group))
        .route("/mine/title", post(register_group_title))
        .route("/:group_id", get(get_group).patch(update_group).delete(delete_group))
        .route("/:group_id/leader", put(set_leader))
}

async fn with_members(state: &AppState, group: ProjectGroup) -> Result<GroupResponse, ApiError> {
    let members = repositories::groups::members(state.db(), group.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load group members"))?;
    Ok(GroupResponse::from_db(group)
        .with_members(members.into_iter().map(StudentResponse::from_db).collect()))
}

async fn auto_partition(
    CurrentUser(principal): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<AutoPartitionRequest>,
) -> Result<(StatusCode, Json<AutoPartitionResponse>), ApiError> {
    validate_payload(&payload)?;

    let defaults = state.settings().grouping();
    let group_size = payload.group_size.unwrap_or(defaults.default_group_size);
    let base_name = payload
        .base_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(&defaults.default_base_name)
        .to_string();

    let mut tx =
        state.db().begin().await.map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let cohort =
        repositories::students::list_cohort(&mut *tx, payload.course_id, payload.year_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load students"))?;
    if cohort.is_empty() {
        return Err(ApiError::NotFound(
            "No students found for the selected course and year".to_string(),
        ));
    }

    let student_ids: Vec<i64> = cohort.iter().map(|student| student.id).collect();
    let planned = grouping::partition(&student_ids, group_size, &base_name)?;

    let now = primitive_now_utc();
    let mut created = Vec::with_capacity(planned.len());
    for plan in &planned {
        let group = repositories::groups::create(
            &mut tx,
            repositories::groups::CreateGroup {
                name: &plan.name,
                course_id: payload.course_id,
                year_id: payload.year_id,
                project_title: None,
                created_at: now,
            },
            &plan.member_ids,
        )
        .await
        .map_err(|e| ApiError::from_db(e, "Failed to create group"))?;
        created.push(group);
    }

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit groups"))?;

    tracing::info!(
        user_id = principal.user_id,
        course_id = payload.course_id,
        year_id = payload.year_id,
        group_size,
        groups = created.len(),
        action = "groups_auto_create",
        "Groups created by partitioning"
    );

    let mut groups = Vec::with_capacity(created.len());
    for group in created {
        groups.push(with_members(&state, group).await?);
    }

    Ok((
        StatusCode::CREATED,
        Json(AutoPartitionResponse {
            message: format!("{} groups created successfully", groups.len()),
            group_names: groups.iter().map(|group| group.name.clone()).collect(),
            groups,
        }),
    ))
}

async fn list_groups(
    CurrentUser(_principal): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<GroupResponse>>, ApiError> {
    let groups = repositories::groups::list(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list groups"))?;

    let mut response = Vec::with_capacity(groups.len());
    for group in groups {
        response.push(with_members(&state, group).await?);
    }
    Ok(Json(response))
}

async fn get_group(
    CurrentUser(_principal): CurrentUser,
    State(state): State<AppState>,
    Path(group_id): Path<i64>,
) -> Result<Json<GroupResponse>, ApiError> {
    let group = repositories::groups::find_by_id(state.db(), group_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load group"))?
        .ok_or_else(|| ApiError::NotFound("Group not found".to_string()))?;
    Ok(Json(with_members(&state, group).await?))
}

/// Every id must name an existing student; duplicates collapse. The student rows stay
/// locked until `tx` ends, so the membership check and the write cannot interleave.
async fn check_members(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    member_ids: &[i64],
    except_group: Option<i64>,
) -> Result<Vec<i64>, ApiError> {
    let mut ids = member_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();

    let found = repositories::students::lock_by_ids(tx, &ids)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to lock students"))?;
    if found.len() != ids.len() {
        return Err(ApiError::NotFound("One or more students were not found".to_string()));
    }

    let taken = repositories::groups::taken_reg_numbers(&mut **tx, &ids, except_group)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check group membership"))?;
    grouping::ensure_exclusive(&taken)?;

    Ok(ids)
}

async fn create_group(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<GroupCreate>,
) -> Result<(StatusCode, Json<GroupResponse>), ApiError> {
    validate_payload(&payload)?;
    let project_title = payload
        .project_title
        .as_deref()
        .filter(|title| !title.trim().is_empty())
        .map(grouping::normalize_title)
        .transpose()?;

    let mut tx =
        state.db().begin().await.map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let course_ok = repositories::reference::course_exists(&mut *tx, payload.course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check course"))?;
    let year_ok = repositories::reference::year_exists(&mut *tx, payload.year_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check year of study"))?;
    if !course_ok || !year_ok {
        return Err(ApiError::BadRequest("Invalid course or year of study".to_string()));
    }

    let member_ids = check_members(&mut tx, &payload.member_ids, None).await?;

    let group = repositories::groups::create(
        &mut tx,
        repositories::groups::CreateGroup {
            name: payload.name.trim(),
            course_id: payload.course_id,
            year_id: payload.year_id,
            project_title: project_title.as_deref(),
            created_at: primitive_now_utc(),
        },
        &member_ids,
    )
    .await
    .map_err(|e| ApiError::from_db(e, "Failed to create group"))?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit group"))?;

    tracing::info!(admin_id = admin.user_id, group_id = group.id, action = "group_create", "Admin created group");

    Ok((StatusCode::CREATED, Json(with_members(&state, group).await?)))
}

async fn update_group(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(group_id): Path<i64>,
    Json(payload): Json<GroupUpdate>,
) -> Result<Json<GroupResponse>, ApiError> {
    validate_payload(&payload)?;

    let mut tx =
        state.db().begin().await.map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let group = repositories::groups::lock_by_id(&mut tx, group_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to lock group"))?
        .ok_or_else(|| ApiError::NotFound("Group not found".to_string()))?;

    let project_title = match payload.project_title.as_deref() {
        Some(title) if title.trim().is_empty() => None,
        Some(title) => Some(grouping::normalize_title(title)?),
        None => group.project_title.clone(),
    };

    let leader_id = match payload.member_ids.as_deref() {
        Some(requested) => {
            let member_ids = check_members(&mut tx, requested, Some(group_id)).await?;
            repositories::groups::replace_members(&mut tx, group_id, &member_ids, primitive_now_utc())
                .await
                .map_err(|e| ApiError::internal(e, "Failed to update group members"))?;
            grouping::retained_leader(group.leader_id, &member_ids)
        }
        None => group.leader_id,
    };

    let updated = repositories::groups::update(
        &mut *tx,
        group_id,
        repositories::groups::UpdateGroup {
            name: payload.name.as_deref().map(str::trim).unwrap_or(&group.name).to_string(),
            project_title,
            leader_id,
        },
    )
    .await
    .map_err(|e| ApiError::from_db(e, "Failed to update group"))?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit group update"))?;

    tracing::info!(admin_id = admin.user_id, group_id, action = "group_update", "Admin updated group");

    Ok(Json(with_members(&state, updated).await?))
}

async fn delete_group(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(group_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let mut tx =
        state.db().begin().await.map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let deleted = repositories::groups::delete(&mut tx, group_id)
        .await
        .map_err(|e| ApiError::from_db(e, "Failed to delete group"))?;
    if !deleted {
        return Err(ApiError::NotFound("Group not found".to_string()));
    }

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit group deletion"))?;

    tracing::info!(admin_id = admin.user_id, group_id, action = "group_delete", "Admin deleted group");
    Ok(StatusCode::NO_CONTENT)
}

async fn set_leader(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(group_id): Path<i64>,
    Json(payload): Json<LeaderRequest>,
) -> Result<Json<GroupResponse>, ApiError> {
    let mut tx =
        state.db().begin().await.map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    repositories::groups::lock_by_id(&mut tx, group_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to lock group"))?
        .ok_or_else(|| ApiError::NotFound("Group not found".to_string()))?;

    let member_ids = repositories::groups::member_ids(&mut *tx, group_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load group members"))?;
    grouping::ensure_member(&member_ids, payload.student_id)?;

    let group = repositories::groups::set_leader(&mut *tx, group_id, payload.student_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to set group leader"))?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit group leader"))?;

    tracing::info!(
        admin_id = admin.user_id,
        group_id,
        leader_id = payload.student_id,
        action = "group_leader_set",
        "Group leader set"
    );

    Ok(Json(with_members(&state, group).await?))
}

async fn my_group(
    student: CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<GroupResponse>, ApiError> {
    let group = repositories::groups::find_for_student(state.db(), student.student_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load group"))?
        .ok_or_else(|| ApiError::NotFound("You are not in a group".to_string()))?;
    Ok(Json(with_members(&state, group).await?))
}

async fn register_group_title(
    student: CurrentStudent,
    State(state): State<AppState>,
    Json(payload): Json<TitleRequest>,
) -> Result<Json<GroupResponse>, ApiError> {
    let title = grouping::normalize_title(&payload.project_title)?;

    let mut tx =
        state.db().begin().await.map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let group_id = repositories::groups::find_for_student(&mut *tx, student.student_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load group"))?
        .map(|group| group.id)
        .ok_or_else(|| ApiError::NotFound("You are not in a group".to_string()))?;

    let group = repositories::groups::lock_by_id(&mut tx, group_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to lock group"))?
        .ok_or_else(|| ApiError::NotFound("Group not found".to_string()))?;
    grouping::ensure_leader(&group, student.student_id)?;

    let updated = repositories::groups::set_project_title(&mut *tx, group_id, &title)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to register group title"))?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit group title"))?;

    tracing::info!(
        student_id = student.student_id,
        group_id,
        action = "group_title_register",
        "Group leader registered project title"
    );

    Ok(Json(with_members(&state, updated).await?))
}

#[cfg(test)]
mod tests;
