use serde::Serialize;
use sqlx::FromRow;
use time::{Date, PrimitiveDateTime};

use crate::db::types::{
    Audience, ConsultationStatus, FileType, MilestoneStatus, OwnerKind, UserRole,
};

#[derive(Debug, Clone, Serialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) email: Option<String>,
    pub(crate) full_name: String,
    #[serde(skip_serializing)]
    pub(crate) hashed_password: String,
    pub(crate) role: Option<UserRole>,
    pub(crate) is_active: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub(crate) struct Student {
    pub(crate) id: i64,
    pub(crate) user_id: i64,
    pub(crate) reg_number: String,
    pub(crate) full_name: String,
    pub(crate) project_title: Option<String>,
    pub(crate) supervisor_id: Option<i64>,
    pub(crate) course_id: Option<i64>,
    pub(crate) year_id: Option<i64>,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub(crate) struct Course {
    pub(crate) id: i64,
    pub(crate) name: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub(crate) struct YearOfStudy {
    pub(crate) id: i64,
    pub(crate) year: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub(crate) struct ProjectGroup {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) course_id: i64,
    pub(crate) year_id: i64,
    pub(crate) project_title: Option<String>,
    pub(crate) leader_id: Option<i64>,
    pub(crate) supervisor_id: Option<i64>,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct Document {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) file_key: String,
    pub(crate) owner_kind: OwnerKind,
    pub(crate) owner_id: i64,
    pub(crate) supervisor_id: i64,
    pub(crate) uploaded_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct FileEntry {
    pub(crate) id: i64,
    pub(crate) student_id: Option<i64>,
    pub(crate) group_id: Option<i64>,
    pub(crate) file_key: String,
    pub(crate) file_name: String,
    pub(crate) file_type: FileType,
    pub(crate) description: String,
    pub(crate) size_bytes: i64,
    pub(crate) checksum: String,
    pub(crate) version: i32,
    pub(crate) year: Option<String>,
    pub(crate) uploaded_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct Consultation {
    pub(crate) id: i64,
    pub(crate) student_id: i64,
    pub(crate) supervisor_id: i64,
    pub(crate) topic: String,
    pub(crate) proposed_date: PrimitiveDateTime,
    pub(crate) status: ConsultationStatus,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub(crate) struct Stage {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct Milestone {
    pub(crate) id: i64,
    pub(crate) student_id: Option<i64>,
    pub(crate) group_id: Option<i64>,
    pub(crate) supervisor_id: i64,
    pub(crate) stage_id: i64,
    pub(crate) title: String,
    pub(crate) status: MilestoneStatus,
    pub(crate) completion_date: Option<Date>,
    pub(crate) remarks: Option<String>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct Announcement {
    pub(crate) id: i64,
    pub(crate) supervisor_id: Option<i64>,
    pub(crate) admin_id: Option<i64>,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) target_group: Audience,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct Feedback {
    pub(crate) id: i64,
    pub(crate) owner_kind: OwnerKind,
    pub(crate) owner_id: i64,
    pub(crate) supervisor_id: i64,
    pub(crate) content: String,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct Project {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) owner_kind: OwnerKind,
    pub(crate) owner_id: i64,
    pub(crate) supervisor_id: Option<i64>,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct Notification {
    pub(crate) id: i64,
    pub(crate) recipient_id: i64,
    pub(crate) message: String,
    pub(crate) is_read: bool,
    pub(crate) created_at: PrimitiveDateTime,
}
