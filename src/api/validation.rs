use std::path::Path;

use validator::Validate;

use crate::api::errors::ApiError;

pub(crate) const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn validate_payload(payload: &impl Validate) -> Result<(), ApiError> {
    payload.validate().map_err(ApiError::from_validation)
}

/// Registration numbers double as usernames: letters, digits, `/` and `-` only.
pub(crate) fn validate_reg_number(reg_number: &str) -> Result<(), ApiError> {
    let trimmed = reg_number.trim();
    let valid = !trimmed.is_empty()
        && trimmed.len() <= 50
        && trimmed.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '-'));
    if valid {
        Ok(())
    } else {
        Err(ApiError::BadRequest("Invalid registration number format".to_string()))
    }
}

pub(crate) fn validate_password_len(password: &str) -> Result<(), ApiError> {
    if password.chars().count() >= MIN_PASSWORD_LEN {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )))
    }
}

/// Checks the extension against the configured allow-list. Content is not inspected.
pub(crate) fn validate_upload_name(
    filename: &str,
    allowed_extensions: &[String],
) -> Result<String, ApiError> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .ok_or_else(|| ApiError::BadRequest("File must have an extension".to_string()))?;

    if allowed_extensions.is_empty() || allowed_extensions.iter().any(|allowed| allowed == &extension)
    {
        Ok(extension)
    } else {
        Err(ApiError::BadRequest(format!("File extension '{extension}' is not allowed")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reg_numbers_accept_common_shapes() {
        assert!(validate_reg_number("S100").is_ok());
        assert!(validate_reg_number("BSc/CS/2021-014").is_ok());
        assert!(validate_reg_number("").is_err());
        assert!(validate_reg_number("S 100").is_err());
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert!(validate_password_len("longenough").is_ok());
        let err = validate_password_len("short").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(message) if message.contains("at least 8")));
    }

    #[test]
    fn upload_extensions_are_checked_case_insensitively() {
        let allowed = vec!["pdf".to_string(), "zip".to_string()];
        assert_eq!(validate_upload_name("Thesis.PDF", &allowed).unwrap(), "pdf");
        assert!(validate_upload_name("script.exe", &allowed).is_err());
        assert!(validate_upload_name("README", &allowed).is_err());
    }
}
