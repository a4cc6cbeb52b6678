use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::db::models::Student;

#[derive(Debug, Serialize)]
pub(crate) struct StudentResponse {
    pub(crate) id: i64,
    pub(crate) user_id: i64,
    pub(crate) reg_number: String,
    pub(crate) full_name: String,
    pub(crate) project_title: Option<String>,
    pub(crate) supervisor_id: Option<i64>,
    pub(crate) course_id: Option<i64>,
    pub(crate) year_id: Option<i64>,
    pub(crate) created_at: String,
}

impl StudentResponse {
    pub(crate) fn from_db(student: Student) -> Self {
        Self {
            id: student.id,
            user_id: student.user_id,
            reg_number: student.reg_number,
            full_name: student.full_name,
            project_title: student.project_title,
            supervisor_id: student.supervisor_id,
            course_id: student.course_id,
            year_id: student.year_id,
            created_at: format_primitive(student.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentProfileResponse {
    #[serde(flatten)]
    pub(crate) student: StudentResponse,
    pub(crate) is_in_group: bool,
    pub(crate) is_group_leader: bool,
    pub(crate) group_id: Option<i64>,
    pub(crate) group_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CohortResponse {
    pub(crate) course_id: i64,
    pub(crate) year_id: i64,
    pub(crate) students: Vec<StudentResponse>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TitleRequest {
    #[serde(alias = "projectTitle")]
    pub(crate) project_title: String,
}
