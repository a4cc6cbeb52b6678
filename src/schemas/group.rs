use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::ProjectGroup;
use crate::schemas::student::StudentResponse;

#[derive(Debug, Serialize)]
pub(crate) struct GroupResponse {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) course_id: i64,
    pub(crate) year_id: i64,
    pub(crate) project_title: Option<String>,
    pub(crate) leader_id: Option<i64>,
    pub(crate) supervisor_id: Option<i64>,
    pub(crate) created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) members: Option<Vec<StudentResponse>>,
}

impl GroupResponse {
    pub(crate) fn from_db(group: ProjectGroup) -> Self {
        Self {
            id: group.id,
            name: group.name,
            course_id: group.course_id,
            year_id: group.year_id,
            project_title: group.project_title,
            leader_id: group.leader_id,
            supervisor_id: group.supervisor_id,
            created_at: format_primitive(group.created_at),
            members: None,
        }
    }

    pub(crate) fn with_members(mut self, members: Vec<StudentResponse>) -> Self {
        self.members = Some(members);
        self
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AutoPartitionRequest {
    #[serde(alias = "courseId")]
    pub(crate) course_id: i64,
    #[serde(alias = "yearId")]
    pub(crate) year_id: i64,
    #[serde(default)]
    #[serde(alias = "groupSize")]
    #[validate(range(min = 1, message = "group_size must be at least 1"))]
    pub(crate) group_size: Option<usize>,
    #[serde(default)]
    #[serde(alias = "baseName")]
    pub(crate) base_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct GroupCreate {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub(crate) name: String,
    #[serde(alias = "courseId")]
    pub(crate) course_id: i64,
    #[serde(alias = "yearId")]
    pub(crate) year_id: i64,
    #[serde(default)]
    #[serde(alias = "projectTitle")]
    pub(crate) project_title: Option<String>,
    #[serde(default)]
    #[serde(alias = "memberIds")]
    pub(crate) member_ids: Vec<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct GroupUpdate {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub(crate) name: Option<String>,
    #[serde(default)]
    #[serde(alias = "projectTitle")]
    pub(crate) project_title: Option<String>,
    #[serde(default)]
    #[serde(alias = "memberIds")]
    pub(crate) member_ids: Option<Vec<i64>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LeaderRequest {
    #[serde(alias = "studentId")]
    pub(crate) student_id: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StudentAssignmentRequest {
    #[serde(alias = "regNumber")]
    pub(crate) reg_number: String,
    #[serde(alias = "supervisorId")]
    pub(crate) supervisor_id: i64,
    #[serde(default)]
    pub(crate) force: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GroupAssignmentRequest {
    #[serde(alias = "groupId")]
    pub(crate) group_id: i64,
    #[serde(alias = "supervisorId")]
    pub(crate) supervisor_id: i64,
    #[serde(default)]
    pub(crate) force: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct AssignmentResponse {
    pub(crate) message: String,
    pub(crate) changed: bool,
    pub(crate) previous_supervisor_id: Option<i64>,
    pub(crate) supervisor_id: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct AutoPartitionResponse {
    pub(crate) message: String,
    pub(crate) group_names: Vec<String>,
    pub(crate) groups: Vec<GroupResponse>,
}
