use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::api::validation::{validate_password_len, validate_payload, validate_reg_number};
use crate::core::redis::rate_limit_key;
use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::User;
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::auth::{ChangePassword, StaffLogin, StudentLogin, StudentRegister, TokenResponse};
use crate::schemas::user::UserResponse;
use crate::schemas::MessageResponse;
use crate::services::access::Role;

/// Max attempts per window for login and registration.
const AUTH_RATE_LIMIT: u64 = 10;
/// Rate limit window in seconds.
const AUTH_RATE_WINDOW_SECONDS: u64 = 60;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/staff-login", post(staff_login))
        .route("/me", get(me))
        .route("/change-password", post(change_password))
}

async fn enforce_rate_limit(
    state: &AppState,
    scope: &str,
    identity: &str,
    message: &'static str,
) -> Result<(), ApiError> {
    let allowed = state
        .redis()
        .rate_limit(&rate_limit_key(scope, identity), AUTH_RATE_LIMIT, AUTH_RATE_WINDOW_SECONDS)
        .await
        .unwrap_or(true);
    if allowed {
        Ok(())
    } else {
        Err(ApiError::TooManyRequests(message))
    }
}

async fn register(
    State(state): State<AppState>,
    Json(payload): Json<StudentRegister>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    validate_payload(&payload)?;
    validate_reg_number(&payload.reg_number)?;
    validate_password_len(&payload.password)?;
    let reg_number = payload.reg_number.trim();

    enforce_rate_limit(&state, "register", reg_number, "Too many registration attempts, try again later")
        .await?;

    if let Some(course_id) = payload.course_id {
        let exists = repositories::reference::course_exists(state.db(), course_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to check course"))?;
        if !exists {
            return Err(ApiError::BadRequest("Invalid course ID".to_string()));
        }
    }
    if let Some(year_id) = payload.year_id {
        let exists = repositories::reference::year_exists(state.db(), year_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to check year of study"))?;
        if !exists {
            return Err(ApiError::BadRequest("Invalid year of study ID".to_string()));
        }
    }

    let email = payload.email.as_deref().map(str::trim).filter(|email| !email.is_empty());
    let existing =
        repositories::users::exists_by_username_or_email(state.db(), reg_number, email)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to check existing user"))?;
    if existing {
        return Err(ApiError::Conflict(
            "A user with this registration number or email already exists".to_string(),
        ));
    }

    let hashed_password = security::hash_password(&payload.password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;
    let now = primitive_now_utc();

    let mut tx =
        state.db().begin().await.map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let user = repositories::users::create(
        &mut *tx,
        repositories::users::CreateUser {
            username: reg_number,
            email,
            full_name: payload.full_name.trim(),
            hashed_password,
            role: Some(UserRole::Student),
            created_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::from_db(e, "Failed to create user"))?;

    repositories::students::create(
        &mut *tx,
        repositories::students::CreateStudent {
            user_id: user.id,
            reg_number,
            full_name: payload.full_name.trim(),
            course_id: payload.course_id,
            year_id: payload.year_id,
            created_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::from_db(e, "Failed to create student"))?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit registration"))?;

    tracing::info!(user_id = user.id, reg_number = %reg_number, "Student registered");

    let response = token_response(&state, user, "student")?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<StudentLogin>,
) -> Result<Json<TokenResponse>, ApiError> {
    if payload.reg_number.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Both registration number and password are required".to_string(),
        ));
    }

    enforce_rate_limit(&state, "login", &payload.reg_number, "Too many login attempts, try again later")
        .await?;

    let user = repositories::users::find_by_username(state.db(), payload.reg_number.trim())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?
        .ok_or(ApiError::Unauthorized("Invalid credentials"))?;

    check_credentials(&user, &payload.password)?;

    let student_id = repositories::students::find_id_by_user_id(state.db(), user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load student profile"))?;
    let role = Role::resolve(user.role, student_id).label();

    Ok(Json(token_response(&state, user, role)?))
}

async fn staff_login(
    State(state): State<AppState>,
    Json(payload): Json<StaffLogin>,
) -> Result<Json<TokenResponse>, ApiError> {
    enforce_rate_limit(&state, "staff-login", &payload.email, "Too many login attempts, try again later")
        .await?;

    let user = repositories::users::find_by_email(state.db(), &payload.email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?
        .ok_or(ApiError::Unauthorized("Invalid email"))?;

    check_credentials(&user, &payload.password)?;

    let role = match Role::resolve(user.role, None) {
        Role::Admin => "admin",
        Role::Supervisor => "supervisor",
        _ => return Err(ApiError::Forbidden("User has no role assigned")),
    };

    Ok(Json(token_response(&state, user, role)?))
}

async fn me(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = repositories::users::find_by_id(state.db(), principal.user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse::from_db(user)))
}

async fn change_password(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Json(payload): Json<ChangePassword>,
) -> Result<Json<MessageResponse>, ApiError> {
    validate_payload(&payload)?;

    let user = repositories::users::find_by_id(state.db(), principal.user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let verified = security::verify_password(&payload.current_password, &user.hashed_password)
        .unwrap_or(false);
    if !verified {
        return Err(ApiError::BadRequest("Current password is incorrect".to_string()));
    }

    let hashed_password = security::hash_password(&payload.new_password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;

    repositories::users::update(
        state.db(),
        user.id,
        repositories::users::UpdateUser {
            full_name: None,
            role: None,
            is_active: None,
            hashed_password: Some(hashed_password),
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update password"))?;

    tracing::info!(user_id = user.id, action = "password_change", "Password changed");

    Ok(Json(MessageResponse { message: "Password changed successfully".to_string() }))
}

fn check_credentials(user: &User, password: &str) -> Result<(), ApiError> {
    let verified = security::verify_password(password, &user.hashed_password)
        .map_err(|_| ApiError::Unauthorized("Invalid credentials"))?;

    if !verified || !user.is_active {
        return Err(ApiError::Unauthorized("Invalid credentials"));
    }
    Ok(())
}

fn token_response(state: &AppState, user: User, role: &'static str) -> Result<TokenResponse, ApiError> {
    let token = security::create_access_token(user.id, state.settings(), None)
        .map_err(|e| ApiError::internal(e, "Failed to create access token"))?;

    Ok(TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
        role,
        user: UserResponse::from_db(user),
    })
}
