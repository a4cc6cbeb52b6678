use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{Announcement, Feedback, Notification, Project};
use crate::db::types::{Audience, OwnerKind};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AnnouncementCreate {
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub(crate) title: String,
    #[validate(length(min = 1, message = "content must not be empty"))]
    pub(crate) content: String,
    #[serde(alias = "targetGroup")]
    pub(crate) target_group: Audience,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnnouncementResponse {
    pub(crate) id: i64,
    pub(crate) supervisor_id: Option<i64>,
    pub(crate) admin_id: Option<i64>,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) target_group: Audience,
    pub(crate) created_at: String,
}

impl AnnouncementResponse {
    pub(crate) fn from_db(announcement: Announcement) -> Self {
        Self {
            id: announcement.id,
            supervisor_id: announcement.supervisor_id,
            admin_id: announcement.admin_id,
            title: announcement.title,
            content: announcement.content,
            target_group: announcement.target_group,
            created_at: format_primitive(announcement.created_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct FeedbackCreate {
    #[serde(alias = "ownerType")]
    pub(crate) owner_type: String,
    #[serde(alias = "ownerId")]
    pub(crate) owner_id: i64,
    #[validate(length(min = 1, message = "content must not be empty"))]
    pub(crate) content: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct FeedbackResponse {
    pub(crate) id: i64,
    pub(crate) owner_type: OwnerKind,
    pub(crate) owner_id: i64,
    pub(crate) owner_name: Option<String>,
    pub(crate) supervisor_id: i64,
    pub(crate) content: String,
    pub(crate) created_at: String,
}

impl FeedbackResponse {
    pub(crate) fn from_db(feedback: Feedback, owner_name: Option<String>) -> Self {
        Self {
            id: feedback.id,
            owner_type: feedback.owner_kind,
            owner_id: feedback.owner_id,
            owner_name,
            supervisor_id: feedback.supervisor_id,
            content: feedback.content,
            created_at: format_primitive(feedback.created_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ProjectCreate {
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(alias = "ownerType")]
    pub(crate) owner_type: String,
    #[serde(alias = "ownerId")]
    pub(crate) owner_id: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProjectResponse {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) owner_type: OwnerKind,
    pub(crate) owner_id: i64,
    pub(crate) owner_name: Option<String>,
    pub(crate) supervisor_id: Option<i64>,
    pub(crate) created_at: String,
}

impl ProjectResponse {
    pub(crate) fn from_db(project: Project, owner_name: Option<String>) -> Self {
        Self {
            id: project.id,
            title: project.title,
            description: project.description,
            owner_type: project.owner_kind,
            owner_id: project.owner_id,
            owner_name,
            supervisor_id: project.supervisor_id,
            created_at: format_primitive(project.created_at),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct NotificationQuery {
    #[serde(default)]
    pub(crate) skip: i64,
    #[serde(default = "crate::api::pagination::default_limit")]
    pub(crate) limit: i64,
    #[serde(default)]
    pub(crate) unread_only: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NotificationUpdate {
    pub(crate) is_read: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct NotificationResponse {
    pub(crate) id: i64,
    pub(crate) message: String,
    pub(crate) is_read: bool,
    pub(crate) created_at: String,
}

impl NotificationResponse {
    pub(crate) fn from_db(notification: Notification) -> Self {
        Self {
            id: notification.id,
            message: notification.message,
            is_read: notification.is_read,
            created_at: format_primitive(notification.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct MarkAllReadResponse {
    pub(crate) updated: u64,
}
