//! Two-phase supervisor assignment.
//!
//! A first call in [`AssignmentMode::Propose`] never overwrites an existing supervisor;
//! it reports [`AssignmentDecision::ConflictDetected`] and the caller repeats the call
//! in [`AssignmentMode::ConfirmOverwrite`].

use crate::services::errors::PolicyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AssignmentMode {
    Propose,
    ConfirmOverwrite,
}

impl AssignmentMode {
    pub(crate) fn from_force(force: bool) -> Self {
        if force {
            AssignmentMode::ConfirmOverwrite
        } else {
            AssignmentMode::Propose
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AssignmentDecision {
    Assign { previous: Option<i64> },
    Unchanged,
    ConflictDetected { current: i64 },
}

impl AssignmentDecision {
    /// Whether the stored value changes, which is exactly when a notification goes out.
    pub(crate) fn changes_supervisor(self) -> bool {
        matches!(self, AssignmentDecision::Assign { .. })
    }

    pub(crate) fn into_result(self, target: &str) -> Result<Self, PolicyError> {
        match self {
            AssignmentDecision::ConflictDetected { .. } => {
                Err(PolicyError::ConfirmationRequired(format!(
                    "{target} already has a supervisor. Resubmit with force=true to overwrite."
                )))
            }
            decision => Ok(decision),
        }
    }
}

/// `current` must be read under the same row lock that guards the write.
pub(crate) fn decide(current: Option<i64>, requested: i64, mode: AssignmentMode) -> AssignmentDecision {
    match (current, mode) {
        (None, _) => AssignmentDecision::Assign { previous: None },
        (Some(current), AssignmentMode::Propose) => AssignmentDecision::ConflictDetected { current },
        (Some(current), AssignmentMode::ConfirmOverwrite) if current == requested => {
            AssignmentDecision::Unchanged
        }
        (Some(current), AssignmentMode::ConfirmOverwrite) => {
            AssignmentDecision::Assign { previous: Some(current) }
        }
    }
}

/// Student-level assignment is superseded by group supervision.
pub(crate) fn ensure_assignable_student(is_grouped: bool) -> Result<(), PolicyError> {
    if is_grouped {
        Err(PolicyError::NotFound("Student not found or already in a group".to_string()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_assignment_needs_no_confirmation() {
        for mode in [AssignmentMode::Propose, AssignmentMode::ConfirmOverwrite] {
            let decision = decide(None, 4, mode);
            assert_eq!(decision, AssignmentDecision::Assign { previous: None });
            assert!(decision.changes_supervisor());
        }
    }

    #[test]
    fn existing_supervisor_requires_confirmation_without_force() {
        let decision = decide(Some(1), 2, AssignmentMode::from_force(false));
        assert_eq!(decision, AssignmentDecision::ConflictDetected { current: 1 });
        assert!(!decision.changes_supervisor());
        assert!(matches!(
            decision.into_result("Student"),
            Err(PolicyError::ConfirmationRequired(_))
        ));
    }

    #[test]
    fn same_supervisor_without_force_still_asks_for_confirmation() {
        let decision = decide(Some(2), 2, AssignmentMode::Propose);
        assert_eq!(decision, AssignmentDecision::ConflictDetected { current: 2 });
    }

    #[test]
    fn forced_overwrite_changes_only_when_value_differs() {
        let changed = decide(Some(1), 2, AssignmentMode::from_force(true));
        assert_eq!(changed, AssignmentDecision::Assign { previous: Some(1) });
        assert!(changed.changes_supervisor());

        let same = decide(Some(2), 2, AssignmentMode::ConfirmOverwrite);
        assert_eq!(same, AssignmentDecision::Unchanged);
        assert!(!same.changes_supervisor());
        assert_eq!(same.into_result("Group"), Ok(AssignmentDecision::Unchanged));
    }

    #[test]
    fn grouped_students_are_not_assignable_individually() {
        assert!(ensure_assignable_student(false).is_ok());
        assert!(matches!(ensure_assignable_student(true), Err(PolicyError::NotFound(_))));
    }
}
