use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::schemas::user::UserResponse;

#[derive(Debug, Serialize)]
pub(crate) struct TokenResponse {
    pub(crate) access_token: String,
    pub(crate) token_type: String,
    pub(crate) role: &'static str,
    pub(crate) user: UserResponse,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct StudentRegister {
    #[serde(alias = "regNumber")]
    #[validate(length(min = 1, max = 50, message = "reg_number must be 1-50 characters"))]
    pub(crate) reg_number: String,
    #[serde(alias = "fullName")]
    #[validate(length(min = 1, max = 255, message = "full_name must not be empty"))]
    pub(crate) full_name: String,
    #[serde(default)]
    #[validate(email(message = "email must be a valid address"))]
    pub(crate) email: Option<String>,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub(crate) password: String,
    #[serde(default)]
    #[serde(alias = "courseId")]
    pub(crate) course_id: Option<i64>,
    #[serde(default)]
    #[serde(alias = "yearId")]
    pub(crate) year_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StudentLogin {
    #[serde(alias = "regNumber")]
    pub(crate) reg_number: String,
    pub(crate) password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StaffLogin {
    pub(crate) email: String,
    pub(crate) password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ChangePassword {
    #[serde(alias = "currentPassword")]
    pub(crate) current_password: String,
    #[serde(alias = "newPassword")]
    #[validate(length(min = 8, message = "new_password must be at least 8 characters"))]
    pub(crate) new_password: String,
}
