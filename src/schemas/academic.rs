use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CourseCreate {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub(crate) name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct YearCreate {
    #[validate(length(min = 1, max = 20, message = "year must be 1-20 characters"))]
    pub(crate) year: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct StageCreate {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) description: Option<String>,
}
