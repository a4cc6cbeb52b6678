use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::User;
use crate::db::types::UserRole;

#[derive(Debug, Serialize)]
pub(crate) struct UserResponse {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) email: Option<String>,
    pub(crate) full_name: String,
    pub(crate) role: Option<UserRole>,
    pub(crate) is_active: bool,
    pub(crate) created_at: String,
}

impl UserResponse {
    pub(crate) fn from_db(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            is_active: user.is_active,
            created_at: format_primitive(user.created_at),
        }
    }
}

/// Public view of a supervisor account.
#[derive(Debug, Serialize)]
pub(crate) struct SupervisorResponse {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) full_name: String,
    pub(crate) email: Option<String>,
}

impl SupervisorResponse {
    pub(crate) fn from_db(user: User) -> Self {
        Self { id: user.id, username: user.username, full_name: user.full_name, email: user.email }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct SupervisorCreate {
    #[validate(length(min = 1, max = 150, message = "username must be 1-150 characters"))]
    pub(crate) username: String,
    #[validate(email(message = "email must be a valid address"))]
    pub(crate) email: String,
    #[serde(alias = "fullName")]
    #[validate(length(min = 1, max = 255, message = "full_name must not be empty"))]
    pub(crate) full_name: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub(crate) password: String,
}
