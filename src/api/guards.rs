use async_trait::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::{header, request::Parts};

use crate::api::errors::ApiError;
use crate::core::{security, state::AppState};
use crate::db::types::UserRole;
use crate::repositories;
use crate::services::access::Principal;

/// Any authenticated, active account. The role is resolved here once per request.
pub(crate) struct CurrentUser(pub(crate) Principal);
pub(crate) struct CurrentAdmin(pub(crate) Principal);
/// Carries the supervisor's user id.
pub(crate) struct CurrentSupervisor(pub(crate) i64);

pub(crate) struct CurrentStudent {
    pub(crate) principal: Principal,
    pub(crate) student_id: i64,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let State(app_state) = State::<AppState>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to access application state"))?;

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let claims = security::verify_token(token, app_state.settings())
            .map_err(|_| ApiError::Unauthorized("Invalid authentication credentials"))?;
        let user_id =
            claims.user_id().ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let user = repositories::users::find_by_id(app_state.db(), user_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load user"))?;

        let Some(user) = user else {
            return Err(ApiError::Unauthorized("User not found"));
        };

        if !user.is_active {
            return Err(ApiError::Unauthorized("Invalid authentication credentials"));
        }

        let student_id = match user.role {
            Some(UserRole::Student) | None => {
                repositories::students::find_id_by_user_id(app_state.db(), user.id)
                    .await
                    .map_err(|e| ApiError::internal(e, "Failed to load student profile"))?
            }
            Some(_) => None,
        };

        Ok(CurrentUser(Principal::from_user(&user, student_id)))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(principal) = CurrentUser::from_request_parts(parts, state).await?;
        principal.require_admin()?;
        Ok(CurrentAdmin(principal))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentSupervisor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(principal) = CurrentUser::from_request_parts(parts, state).await?;
        Ok(CurrentSupervisor(principal.require_supervisor()?))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentStudent {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(principal) = CurrentUser::from_request_parts(parts, state).await?;
        let student_id = principal.require_student()?;
        Ok(CurrentStudent { principal, student_id })
    }
}
