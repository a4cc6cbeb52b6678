use crate::db::models::ProjectGroup;
use crate::services::errors::PolicyError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlannedGroup {
    pub(crate) name: String,
    pub(crate) member_ids: Vec<i64>,
}

/// Splits an already ordered cohort into consecutive chunks of `group_size`.
/// The last chunk may be smaller. Group numbering starts at 1.
pub(crate) fn partition(
    student_ids: &[i64],
    group_size: usize,
    base_name: &str,
) -> Result<Vec<PlannedGroup>, PolicyError> {
    if group_size == 0 {
        return Err(PolicyError::Validation("group_size must be at least 1".to_string()));
    }
    let base_name = base_name.trim();
    if base_name.is_empty() {
        return Err(PolicyError::Validation("base_name must not be empty".to_string()));
    }

    Ok(student_ids
        .chunks(group_size)
        .enumerate()
        .map(|(index, chunk)| PlannedGroup {
            name: format!("{base_name} {}", index + 1),
            member_ids: chunk.to_vec(),
        })
        .collect())
}

pub(crate) fn ensure_member(member_ids: &[i64], student_id: i64) -> Result<(), PolicyError> {
    if member_ids.contains(&student_id) {
        Ok(())
    } else {
        Err(PolicyError::Forbidden("Student is not a member of this group"))
    }
}

pub(crate) fn ensure_leader(group: &ProjectGroup, student_id: i64) -> Result<(), PolicyError> {
    match group.leader_id {
        Some(leader_id) if leader_id == student_id => Ok(()),
        _ => Err(PolicyError::Forbidden("Only the group leader can perform this action")),
    }
}

/// Individual title registration is closed to students who already belong to a group.
pub(crate) fn ensure_individual_path(is_grouped: bool) -> Result<(), PolicyError> {
    if is_grouped {
        Err(PolicyError::Forbidden(
            "Students in a group must register the project title through the group",
        ))
    } else {
        Ok(())
    }
}

/// `taken` lists reg numbers of requested members that already sit in another group.
pub(crate) fn ensure_exclusive(taken: &[String]) -> Result<(), PolicyError> {
    if taken.is_empty() {
        Ok(())
    } else {
        Err(PolicyError::Conflict(format!(
            "Students already belong to another group: {}",
            taken.join(", ")
        )))
    }
}

/// Leader survives a membership rewrite only while still a member.
pub(crate) fn retained_leader(leader_id: Option<i64>, member_ids: &[i64]) -> Option<i64> {
    leader_id.filter(|leader| member_ids.contains(leader))
}

pub(crate) fn normalize_title(title: &str) -> Result<String, PolicyError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(PolicyError::Validation("project_title must not be empty".to_string()));
    }
    if trimmed.chars().count() > 255 {
        return Err(PolicyError::Validation(
            "project_title must be at most 255 characters".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::core::time::primitive_now_utc;

    fn group(leader_id: Option<i64>) -> ProjectGroup {
        ProjectGroup {
            id: 1,
            name: "Group 1".to_string(),
            course_id: 1,
            year_id: 1,
            project_title: None,
            leader_id,
            supervisor_id: None,
            created_at: primitive_now_utc(),
        }
    }

    #[test]
    fn partition_covers_every_student_once() {
        for total in [0usize, 1, 3, 4, 5, 8, 9, 17] {
            let ids: Vec<i64> = (1..=total as i64).collect();
            let groups = partition(&ids, 4, "Group").expect("partition");

            assert_eq!(groups.len(), total.div_ceil(4));
            assert!(groups.iter().all(|group| group.member_ids.len() <= 4));

            let members: Vec<i64> =
                groups.iter().flat_map(|group| group.member_ids.iter().copied()).collect();
            let unique: HashSet<i64> = members.iter().copied().collect();
            assert_eq!(members.len(), unique.len());
            assert_eq!(members, ids);
        }
    }

    #[test]
    fn partition_names_groups_sequentially() {
        let groups = partition(&[1, 2, 3, 4, 5], 2, "Team").expect("partition");
        let names: Vec<&str> = groups.iter().map(|group| group.name.as_str()).collect();
        assert_eq!(names, ["Team 1", "Team 2", "Team 3"]);
        assert_eq!(groups[2].member_ids, vec![5]);
    }

    #[test]
    fn partition_rejects_zero_size() {
        assert!(matches!(partition(&[1], 0, "Group"), Err(PolicyError::Validation(_))));
        assert!(matches!(partition(&[1], 2, "  "), Err(PolicyError::Validation(_))));
    }

    #[test]
    fn leader_must_be_member() {
        assert!(ensure_member(&[1, 2], 2).is_ok());
        assert!(matches!(ensure_member(&[1, 2], 3), Err(PolicyError::Forbidden(_))));
    }

    #[test]
    fn only_leader_may_act_for_group() {
        assert!(ensure_leader(&group(Some(5)), 5).is_ok());
        assert!(ensure_leader(&group(Some(5)), 6).is_err());
        assert!(ensure_leader(&group(None), 5).is_err());
    }

    #[test]
    fn grouped_students_cannot_use_individual_path() {
        assert!(ensure_individual_path(false).is_ok());
        assert!(matches!(ensure_individual_path(true), Err(PolicyError::Forbidden(_))));
    }

    #[test]
    fn exclusivity_reports_taken_students() {
        assert!(ensure_exclusive(&[]).is_ok());
        let err = ensure_exclusive(&["S1".to_string(), "S2".to_string()]).unwrap_err();
        assert_eq!(
            err,
            PolicyError::Conflict("Students already belong to another group: S1, S2".to_string())
        );
    }

    #[test]
    fn leader_is_dropped_when_removed_from_members() {
        assert_eq!(retained_leader(Some(2), &[1, 2]), Some(2));
        assert_eq!(retained_leader(Some(3), &[1, 2]), None);
        assert_eq!(retained_leader(None, &[1]), None);
    }

    #[test]
    fn titles_are_trimmed_and_required() {
        assert_eq!(normalize_title("  AI System ").unwrap(), "AI System");
        assert!(normalize_title("   ").is_err());
    }
}
