use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentAdmin, CurrentStudent, CurrentUser};
use crate::api::pagination::{PageQuery, PaginatedResponse};
use crate::core::state::AppState;
use crate::db::models::Student;
use crate::repositories;
use crate::schemas::student::{CohortResponse, StudentProfileResponse, StudentResponse, TitleRequest};
use crate::schemas::user::SupervisorResponse;
use crate::services::grouping;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_students))
        .route("/grouped", get(grouped_students))
        .route("/without-group", get(students_without_group))
        .route("/me", get(my_profile))
        .route("/me/title", post(register_title))
        .route("/me/supervisor", get(my_supervisor))
        .route("/me/group-supervisor", get(my_group_supervisor))
}

async fn list_students(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<PaginatedResponse<StudentResponse>>, ApiError> {
    let page = page.normalized();
    let students = repositories::students::list(state.db(), page.skip, page.limit)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list students"))?;
    let total_count = repositories::students::count(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count students"))?;

    Ok(Json(PaginatedResponse {
        items: students.into_iter().map(StudentResponse::from_db).collect(),
        total_count,
        skip: page.skip,
        limit: page.limit,
    }))
}

/// Students bucketed by (course, year). Rows arrive sorted, so buckets are contiguous.
fn bucket_by_cohort(students: Vec<Student>) -> Vec<CohortResponse> {
    let mut cohorts: Vec<CohortResponse> = Vec::new();
    for student in students {
        let (Some(course_id), Some(year_id)) = (student.course_id, student.year_id) else {
            continue;
        };
        match cohorts.last_mut() {
            Some(last) if last.course_id == course_id && last.year_id == year_id => {
                last.students.push(StudentResponse::from_db(student));
            }
            _ => cohorts.push(CohortResponse {
                course_id,
                year_id,
                students: vec![StudentResponse::from_db(student)],
            }),
        }
    }
    cohorts
}

async fn grouped_students(
    CurrentUser(_principal): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<CohortResponse>>, ApiError> {
    let students = repositories::students::list_with_cohort(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list students"))?;
    Ok(Json(bucket_by_cohort(students)))
}

async fn students_without_group(
    CurrentUser(_principal): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<StudentResponse>>, ApiError> {
    let students = repositories::students::list_without_group(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list students without a group"))?;
    Ok(Json(students.into_iter().map(StudentResponse::from_db).collect()))
}

async fn load_student(state: &AppState, student_id: i64) -> Result<Student, ApiError> {
    repositories::students::find_by_id(state.db(), student_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load student"))?
        .ok_or_else(|| ApiError::NotFound("Student profile not found".to_string()))
}

async fn my_profile(
    student: CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<StudentProfileResponse>, ApiError> {
    let profile = load_student(&state, student.student_id).await?;
    let group = repositories::groups::find_for_student(state.db(), student.student_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load group"))?;

    let is_group_leader =
        group.as_ref().is_some_and(|group| group.leader_id == Some(student.student_id));

    Ok(Json(StudentProfileResponse {
        student: StudentResponse::from_db(profile),
        is_in_group: group.is_some(),
        is_group_leader,
        group_id: group.as_ref().map(|group| group.id),
        group_name: group.map(|group| group.name),
    }))
}

async fn register_title(
    student: CurrentStudent,
    State(state): State<AppState>,
    Json(payload): Json<TitleRequest>,
) -> Result<Json<StudentResponse>, ApiError> {
    let title = grouping::normalize_title(&payload.project_title)?;

    let mut tx =
        state.db().begin().await.map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    repositories::students::lock_by_id(&mut tx, student.student_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to lock student"))?
        .ok_or_else(|| ApiError::NotFound("Student profile not found".to_string()))?;

    let is_grouped = repositories::groups::is_grouped(&mut *tx, student.student_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check group membership"))?;
    grouping::ensure_individual_path(is_grouped)?;

    let updated = repositories::students::set_project_title(&mut *tx, student.student_id, &title)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to register project title"))?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit project title"))?;

    tracing::info!(
        student_id = student.student_id,
        user_id = student.principal.user_id,
        action = "student_title_register",
        "Student registered project title"
    );

    Ok(Json(StudentResponse::from_db(updated)))
}

async fn supervisor_response(
    state: &AppState,
    supervisor_id: Option<i64>,
) -> Result<Json<SupervisorResponse>, ApiError> {
    let Some(supervisor_id) = supervisor_id else {
        return Err(ApiError::NotFound("No supervisor assigned".to_string()));
    };

    let supervisor = repositories::users::find_by_id(state.db(), supervisor_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load supervisor"))?
        .ok_or_else(|| ApiError::NotFound("No supervisor assigned".to_string()))?;

    Ok(Json(SupervisorResponse::from_db(supervisor)))
}

async fn my_supervisor(
    student: CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<SupervisorResponse>, ApiError> {
    let profile = load_student(&state, student.student_id).await?;
    supervisor_response(&state, profile.supervisor_id).await
}

async fn my_group_supervisor(
    student: CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<SupervisorResponse>, ApiError> {
    let group = repositories::groups::find_for_student(state.db(), student.student_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load group"))?
        .ok_or_else(|| ApiError::NotFound("You are not in a group".to_string()))?;
    supervisor_response(&state, group.supervisor_id).await
}

#[cfg(test)]
mod tests;
