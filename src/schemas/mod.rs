use std::collections::HashMap;

use serde::Serialize;

pub(crate) mod academic;
pub(crate) mod auth;
pub(crate) mod communication;
pub(crate) mod documents;
pub(crate) mod group;
pub(crate) mod progress;
pub(crate) mod student;
pub(crate) mod user;

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) service: String,
    pub(crate) status: String,
    pub(crate) schema_version: Option<i64>,
    pub(crate) components: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RootResponse {
    pub(crate) message: String,
    pub(crate) version: String,
    pub(crate) docs_url: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct MessageResponse {
    pub(crate) message: String,
}
