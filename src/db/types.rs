use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "userrole", rename_all = "lowercase")]
pub(crate) enum UserRole {
    Admin,
    Supervisor,
    Student,
}

/// Discriminant of a polymorphic owner reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "ownerkind", rename_all = "lowercase")]
pub(crate) enum OwnerKind {
    Student,
    #[serde(alias = "projectgroup")]
    Group,
}

impl OwnerKind {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            OwnerKind::Student => "student",
            OwnerKind::Group => "group",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "filetype", rename_all = "snake_case")]
pub(crate) enum FileType {
    Document,
    SourceCode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "consultationstatus", rename_all = "lowercase")]
pub(crate) enum ConsultationStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "milestonestatus", rename_all = "snake_case")]
pub(crate) enum MilestoneStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "audience", rename_all = "lowercase")]
pub(crate) enum Audience {
    Supervisors,
    Students,
}
