//! Notification side-channel.
//!
//! Write paths return the events they emit; [`dispatch`] delivers them after the
//! triggering transaction has committed. Delivery failures are logged and counted,
//! never returned to the caller.

use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::{ProjectGroup, Student, User};
use crate::repositories;
use crate::services::mailer::EmailMessage;
use crate::services::ownership::Owner;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NotificationEvent {
    pub(crate) recipient_id: i64,
    pub(crate) message: String,
    pub(crate) email: Option<EmailMessage>,
}

fn salutation(recipient: &User) -> &str {
    if recipient.full_name.trim().is_empty() {
        &recipient.username
    } else {
        &recipient.full_name
    }
}

fn email_for(recipient: &User, subject: &str, body: String) -> Option<EmailMessage> {
    recipient.email.as_ref().filter(|email| !email.is_empty()).map(|to| EmailMessage {
        to: to.clone(),
        subject: subject.to_string(),
        body,
    })
}

pub(crate) fn student_assigned(supervisor: &User, student: &Student) -> NotificationEvent {
    let body = format!(
        "Dear {},\n\nYou have been assigned a new student:\n\nName: {}\nReg No: {}\nProject Title: {}\n\nPlease log in to your dashboard to view more details.",
        salutation(supervisor),
        student.full_name,
        student.reg_number,
        student.project_title.as_deref().unwrap_or("N/A"),
    );

    NotificationEvent {
        recipient_id: supervisor.id,
        message: format!(
            "You have been assigned a new student: {} ({})",
            student.full_name, student.reg_number
        ),
        email: email_for(supervisor, "New Student Assignment Notification", body),
    }
}

pub(crate) fn group_assigned(
    supervisor: &User,
    group: &ProjectGroup,
    member_count: usize,
) -> NotificationEvent {
    let body = format!(
        "Dear {},\n\nYou have been assigned a new project group:\n\nGroup: {}\nMembers: {}\nProject Title: {}\n\nPlease log in to your dashboard to view more details.",
        salutation(supervisor),
        group.name,
        member_count,
        group.project_title.as_deref().unwrap_or("N/A"),
    );

    NotificationEvent {
        recipient_id: supervisor.id,
        message: format!("You have been assigned a new group: {}", group.name),
        email: email_for(supervisor, "New Group Assignment Notification", body),
    }
}

pub(crate) fn document_uploaded(supervisor: &User, owner: &Owner, title: &str) -> NotificationEvent {
    let (message, uploader) = match owner {
        Owner::Student(student) => (
            format!("{} has uploaded a new document: {title}", student.full_name),
            format!("Your student {} ({})", student.full_name, student.reg_number),
        ),
        Owner::Group(group) => (
            format!("Group {} has uploaded a new document: {title}", group.name),
            format!("Your group {}", group.name),
        ),
    };

    let body = format!(
        "Dear {},\n\n{uploader} has uploaded a new document:\nTitle: {title}\n\nPlease log in to your dashboard to review it.",
        salutation(supervisor),
    );

    NotificationEvent {
        recipient_id: supervisor.id,
        message,
        email: email_for(supervisor, "Document Upload Notification", body),
    }
}

/// Persists and mails each event. Never fails.
pub(crate) async fn dispatch(state: &AppState, events: Vec<NotificationEvent>) {
    for event in events {
        let stored = repositories::notifications::create(
            state.db(),
            event.recipient_id,
            &event.message,
            primitive_now_utc(),
        )
        .await;

        if let Err(err) = stored {
            tracing::warn!(
                error = %err,
                recipient_id = event.recipient_id,
                "Failed to store notification"
            );
            metrics::counter!("notifications_dispatched_total", "outcome" => "store_failed")
                .increment(1);
            continue;
        }

        let outcome = match (&event.email, state.mailer()) {
            (Some(email), Some(mailer)) => match mailer.send(email).await {
                Ok(()) => "mailed",
                Err(err) => {
                    tracing::warn!(
                        error = %err,
                        recipient_id = event.recipient_id,
                        "Failed to send notification email"
                    );
                    "mail_failed"
                }
            },
            _ => "stored",
        };

        metrics::counter!("notifications_dispatched_total", "outcome" => outcome).increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supervisor(email: Option<&str>) -> User {
        let now = primitive_now_utc();
        User {
            id: 21,
            username: "sup1".to_string(),
            email: email.map(str::to_string),
            full_name: "Dr. Sup".to_string(),
            hashed_password: String::new(),
            role: Some(crate::db::types::UserRole::Supervisor),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn student() -> Student {
        Student {
            id: 3,
            user_id: 30,
            reg_number: "S100".to_string(),
            full_name: "Ada Student".to_string(),
            project_title: None,
            supervisor_id: Some(21),
            course_id: None,
            year_id: None,
            created_at: primitive_now_utc(),
        }
    }

    #[test]
    fn student_assignment_message_names_the_student() {
        let event = student_assigned(&supervisor(Some("sup@example.com")), &student());
        assert_eq!(event.recipient_id, 21);
        assert_eq!(event.message, "You have been assigned a new student: Ada Student (S100)");

        let email = event.email.expect("email");
        assert_eq!(email.to, "sup@example.com");
        assert!(email.body.contains("Project Title: N/A"));
    }

    #[test]
    fn missing_address_skips_only_the_email() {
        let event = student_assigned(&supervisor(None), &student());
        assert!(event.email.is_none());
        assert!(!event.message.is_empty());
    }

    #[test]
    fn group_upload_names_the_group() {
        let group = ProjectGroup {
            id: 5,
            name: "Group 2".to_string(),
            course_id: 1,
            year_id: 1,
            project_title: None,
            leader_id: Some(3),
            supervisor_id: Some(21),
            created_at: primitive_now_utc(),
        };
        let event = document_uploaded(&supervisor(None), &Owner::Group(group), "Draft");
        assert_eq!(event.message, "Group Group 2 has uploaded a new document: Draft");
    }
}
