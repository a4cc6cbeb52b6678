use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::{format_date, format_primitive};
use crate::db::models::{Consultation, Milestone};
use crate::db::types::{ConsultationStatus, MilestoneStatus};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ConsultationCreate {
    #[validate(length(min = 1, max = 255, message = "topic must be 1-255 characters"))]
    pub(crate) topic: String,
    /// RFC 3339 timestamp.
    #[serde(alias = "proposedDate")]
    pub(crate) proposed_date: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConsultationStatusUpdate {
    pub(crate) status: ConsultationStatus,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConsultationQuery {
    #[serde(default)]
    pub(crate) status: Option<ConsultationStatus>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ConsultationResponse {
    pub(crate) id: i64,
    pub(crate) student_id: i64,
    pub(crate) supervisor_id: i64,
    pub(crate) topic: String,
    pub(crate) proposed_date: String,
    pub(crate) status: ConsultationStatus,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl ConsultationResponse {
    pub(crate) fn from_db(consultation: Consultation) -> Self {
        Self {
            id: consultation.id,
            student_id: consultation.student_id,
            supervisor_id: consultation.supervisor_id,
            topic: consultation.topic,
            proposed_date: format_primitive(consultation.proposed_date),
            status: consultation.status,
            created_at: format_primitive(consultation.created_at),
            updated_at: format_primitive(consultation.updated_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct MilestoneCreate {
    #[serde(default)]
    #[serde(alias = "studentId")]
    pub(crate) student_id: Option<i64>,
    #[serde(default)]
    #[serde(alias = "groupId")]
    pub(crate) group_id: Option<i64>,
    #[serde(alias = "stageId")]
    pub(crate) stage_id: i64,
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) status: Option<String>,
    #[serde(default)]
    #[serde(alias = "completionDate")]
    pub(crate) completion_date: Option<String>,
    #[serde(default)]
    pub(crate) remarks: Option<String>,
}

/// PATCH and PUT share this shape; absent fields keep their values.
#[derive(Debug, Deserialize, Validate)]
pub(crate) struct MilestoneUpdate {
    #[serde(default)]
    #[serde(alias = "stageId")]
    pub(crate) stage_id: Option<i64>,
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) status: Option<String>,
    #[serde(default)]
    #[serde(alias = "completionDate")]
    pub(crate) completion_date: Option<String>,
    #[serde(default)]
    pub(crate) remarks: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MilestoneQuery {
    #[serde(default)]
    #[serde(alias = "studentId")]
    pub(crate) student_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct MilestoneResponse {
    pub(crate) id: i64,
    pub(crate) student_id: Option<i64>,
    pub(crate) group_id: Option<i64>,
    pub(crate) supervisor_id: i64,
    pub(crate) stage_id: i64,
    pub(crate) title: String,
    pub(crate) status: MilestoneStatus,
    pub(crate) completion_date: Option<String>,
    pub(crate) remarks: Option<String>,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl MilestoneResponse {
    pub(crate) fn from_db(milestone: Milestone) -> Self {
        Self {
            id: milestone.id,
            student_id: milestone.student_id,
            group_id: milestone.group_id,
            supervisor_id: milestone.supervisor_id,
            stage_id: milestone.stage_id,
            title: milestone.title,
            status: milestone.status,
            completion_date: milestone.completion_date.map(format_date),
            remarks: milestone.remarks,
            created_at: format_primitive(milestone.created_at),
            updated_at: format_primitive(milestone.updated_at),
        }
    }
}
