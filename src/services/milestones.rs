use time::Date;

use crate::db::models::{Milestone, ProjectGroup};
use crate::db::types::MilestoneStatus;
use crate::services::errors::PolicyError;

/// A group milestone may only be created by the group's assigned supervisor.
pub(crate) fn ensure_group_supervisor(group: &ProjectGroup, supervisor_id: i64) -> Result<(), PolicyError> {
    if group.supervisor_id == Some(supervisor_id) {
        Ok(())
    } else {
        Err(PolicyError::Forbidden("You are not the supervisor of this group"))
    }
}

/// Only the creating supervisor may change a milestone; admins included.
pub(crate) fn ensure_creator(milestone: &Milestone, user_id: i64) -> Result<(), PolicyError> {
    if milestone.supervisor_id == user_id {
        Ok(())
    } else {
        Err(PolicyError::Forbidden("Only the supervisor who created this milestone can update it"))
    }
}

pub(crate) fn parse_status(value: &str) -> Result<MilestoneStatus, PolicyError> {
    match value.trim() {
        "Pending" => Ok(MilestoneStatus::Pending),
        "In Progress" => Ok(MilestoneStatus::InProgress),
        "Completed" => Ok(MilestoneStatus::Completed),
        other => Err(PolicyError::Validation(format!(
            "Invalid status '{other}'. Expected one of: Pending, In Progress, Completed"
        ))),
    }
}

pub(crate) fn parse_completion_date(value: Option<&str>) -> Result<Option<Date>, PolicyError> {
    match value.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(raw) => crate::core::time::parse_date(raw).map(Some).ok_or_else(|| {
            PolicyError::Validation("completion_date must be formatted as YYYY-MM-DD".to_string())
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::primitive_now_utc;

    fn milestone(supervisor_id: i64) -> Milestone {
        let now = primitive_now_utc();
        Milestone {
            id: 1,
            student_id: Some(3),
            group_id: None,
            supervisor_id,
            stage_id: 1,
            title: "Literature review".to_string(),
            status: MilestoneStatus::Pending,
            completion_date: None,
            remarks: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn group(supervisor_id: Option<i64>) -> ProjectGroup {
        ProjectGroup {
            id: 2,
            name: "Group 1".to_string(),
            course_id: 1,
            year_id: 1,
            project_title: None,
            leader_id: None,
            supervisor_id,
            created_at: primitive_now_utc(),
        }
    }

    #[test]
    fn non_creators_are_always_forbidden() {
        let milestone = milestone(10);
        assert!(ensure_creator(&milestone, 10).is_ok());
        for other in [1, 11, 99] {
            assert!(matches!(ensure_creator(&milestone, other), Err(PolicyError::Forbidden(_))));
        }
    }

    #[test]
    fn group_milestones_need_the_group_supervisor() {
        assert!(ensure_group_supervisor(&group(Some(4)), 4).is_ok());
        assert!(ensure_group_supervisor(&group(Some(4)), 5).is_err());
        assert!(ensure_group_supervisor(&group(None), 4).is_err());
    }

    #[test]
    fn status_labels_parse() {
        assert_eq!(parse_status("In Progress"), Ok(MilestoneStatus::InProgress));
        assert_eq!(parse_status("Completed"), Ok(MilestoneStatus::Completed));
        assert!(parse_status("done").is_err());
    }

    #[test]
    fn completion_dates_are_iso() {
        assert_eq!(parse_completion_date(None), Ok(None));
        assert_eq!(parse_completion_date(Some("")), Ok(None));
        assert!(parse_completion_date(Some("2025-05-01")).unwrap().is_some());
        assert!(parse_completion_date(Some("01/05/2025")).is_err());
    }
}
