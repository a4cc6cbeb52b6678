use std::collections::BTreeMap;

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::services::errors::PolicyError;
use crate::services::ownership::ResolveError;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    status: u16,
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    requires_confirmation: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<BTreeMap<String, Vec<String>>>,
}

impl ErrorResponse {
    fn plain(status: StatusCode, detail: String) -> Self {
        Self { status: status.as_u16(), detail, requires_confirmation: None, errors: None }
    }
}

#[derive(Debug)]
pub(crate) enum ApiError {
    Unauthorized(&'static str),
    Forbidden(&'static str),
    BadRequest(String),
    /// Field-level validation failure.
    Validation {
        detail: String,
        errors: BTreeMap<String, Vec<String>>,
    },
    /// The write would overwrite existing data; resubmit with `force=true`.
    ConfirmationRequired(String),
    NotFound(String),
    Conflict(String),
    TooManyRequests(&'static str),
    ServiceUnavailable(String),
    Internal(String),
}

impl ApiError {
    /// Log the underlying error with context and return an `Internal` variant.
    pub(crate) fn internal(err: impl std::fmt::Display, context: &str) -> Self {
        tracing::error!(error = %err, "{context}");
        Self::Internal(context.to_string())
    }

    /// Maps constraint violations to client errors; everything else is internal.
    pub(crate) fn from_db(err: sqlx::Error, context: &str) -> Self {
        if let sqlx::Error::Database(db_error) = &err {
            match db_error.code().as_deref() {
                Some("23505") => {
                    return Self::Conflict(format!("{context}: record already exists"));
                }
                Some("23503") => {
                    return Self::Conflict(format!(
                        "{context}: record is referenced by or references missing data"
                    ));
                }
                Some("23514") => {
                    return Self::BadRequest(format!("{context}: constraint violated"));
                }
                _ => {}
            }
        }
        Self::internal(err, context)
    }

    pub(crate) fn from_validation(errors: validator::ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, failures)| {
                let messages = failures
                    .iter()
                    .map(|failure| {
                        failure
                            .message
                            .as_ref()
                            .map(|message| message.to_string())
                            .unwrap_or_else(|| failure.code.to_string())
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();

        Self::Validation { detail: "Validation failed".to_string(), errors: fields }
    }

    pub(crate) fn from_resolve(err: ResolveError, context: &str) -> Self {
        match err {
            ResolveError::NotFound(owner) => {
                Self::NotFound(format!("{} {} not found", owner.kind().as_str(), owner.id()))
            }
            ResolveError::Database(err) => Self::internal(err, context),
        }
    }
}

impl From<PolicyError> for ApiError {
    fn from(err: PolicyError) -> Self {
        match err {
            PolicyError::Validation(message) => ApiError::BadRequest(message),
            PolicyError::NotFound(message) => ApiError::NotFound(message),
            PolicyError::Forbidden(message) => ApiError::Forbidden(message),
            PolicyError::Conflict(message) => ApiError::Conflict(message),
            PolicyError::ConfirmationRequired(message) => ApiError::ConfirmationRequired(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized(message) => {
                let status = StatusCode::UNAUTHORIZED;
                let mut response =
                    (status, Json(ErrorResponse::plain(status, message.to_string())))
                        .into_response();
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                response
            }
            ApiError::Forbidden(message) => {
                let status = StatusCode::FORBIDDEN;
                (status, Json(ErrorResponse::plain(status, message.to_string()))).into_response()
            }
            ApiError::BadRequest(message) => {
                let status = StatusCode::BAD_REQUEST;
                (status, Json(ErrorResponse::plain(status, message))).into_response()
            }
            ApiError::Validation { detail, errors } => {
                let status = StatusCode::BAD_REQUEST;
                let body = ErrorResponse {
                    status: status.as_u16(),
                    detail,
                    requires_confirmation: None,
                    errors: Some(errors),
                };
                (status, Json(body)).into_response()
            }
            ApiError::ConfirmationRequired(message) => {
                let status = StatusCode::BAD_REQUEST;
                let body = ErrorResponse {
                    status: status.as_u16(),
                    detail: message,
                    requires_confirmation: Some(true),
                    errors: None,
                };
                (status, Json(body)).into_response()
            }
            ApiError::NotFound(message) => {
                let status = StatusCode::NOT_FOUND;
                (status, Json(ErrorResponse::plain(status, message))).into_response()
            }
            ApiError::Conflict(message) => {
                let status = StatusCode::CONFLICT;
                (status, Json(ErrorResponse::plain(status, message))).into_response()
            }
            ApiError::TooManyRequests(message) => {
                let status = StatusCode::TOO_MANY_REQUESTS;
                (status, Json(ErrorResponse::plain(status, message.to_string()))).into_response()
            }
            ApiError::ServiceUnavailable(message) => {
                tracing::error!(error = %message, "Service unavailable");
                let status = StatusCode::SERVICE_UNAVAILABLE;
                (status, Json(ErrorResponse::plain(status, message))).into_response()
            }
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "Internal server error");
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                (status, Json(ErrorResponse::plain(status, message))).into_response()
            }
        }
    }
}
