use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentAdmin;
use crate::api::validation::validate_payload;
use crate::core::state::AppState;
use crate::db::models::{Course, YearOfStudy};
use crate::repositories;
use crate::schemas::academic::{CourseCreate, YearCreate};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/courses", get(list_courses).post(create_course))
        .route("/courses/:course_id", delete(delete_course))
        .route("/years", get(list_years).post(create_year))
        .route("/years/:year_id", delete(delete_year))
}

async fn list_courses(State(state): State<AppState>) -> Result<Json<Vec<Course>>, ApiError> {
    let courses = repositories::reference::list_courses(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list courses"))?;
    Ok(Json(courses))
}

async fn create_course(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<CourseCreate>,
) -> Result<(StatusCode, Json<Course>), ApiError> {
    validate_payload(&payload)?;
    let course = repositories::reference::create_course(state.db(), payload.name.trim())
        .await
        .map_err(|e| ApiError::from_db(e, "Failed to create course"))?;
    Ok((StatusCode::CREATED, Json(course)))
}

async fn delete_course(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(course_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let deleted = repositories::reference::delete_course(state.db(), course_id)
        .await
        .map_err(|e| ApiError::from_db(e, "Failed to delete course"))?;
    if !deleted {
        return Err(ApiError::NotFound("Course not found".to_string()));
    }

    tracing::info!(admin_id = admin.user_id, course_id, action = "course_delete", "Admin deleted course");
    Ok(StatusCode::NO_CONTENT)
}

async fn list_years(State(state): State<AppState>) -> Result<Json<Vec<YearOfStudy>>, ApiError> {
    let years = repositories::reference::list_years(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list years of study"))?;
    Ok(Json(years))
}

async fn create_year(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<YearCreate>,
) -> Result<(StatusCode, Json<YearOfStudy>), ApiError> {
    validate_payload(&payload)?;
    let year = repositories::reference::create_year(state.db(), payload.year.trim())
        .await
        .map_err(|e| ApiError::from_db(e, "Failed to create year of study"))?;
    Ok((StatusCode::CREATED, Json(year)))
}

async fn delete_year(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(year_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let deleted = repositories::reference::delete_year(state.db(), year_id)
        .await
        .map_err(|e| ApiError::from_db(e, "Failed to delete year of study"))?;
    if !deleted {
        return Err(ApiError::NotFound("Year of study not found".to_string()));
    }

    tracing::info!(admin_id = admin.user_id, year_id, action = "year_delete", "Admin deleted year of study");
    Ok(StatusCode::NO_CONTENT)
}
