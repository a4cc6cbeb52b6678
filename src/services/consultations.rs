use crate::db::types::ConsultationStatus;
use crate::services::errors::PolicyError;

/// Consultations are decided once: Pending moves to Approved or Rejected and stays there.
pub(crate) fn consultation_transition(
    current: ConsultationStatus,
    requested: ConsultationStatus,
) -> Result<ConsultationStatus, PolicyError> {
    match (current, requested) {
        (_, ConsultationStatus::Pending) => Err(PolicyError::Validation(
            "status must be Approved or Rejected".to_string(),
        )),
        (ConsultationStatus::Pending, next) => Ok(next),
        (decided, _) => Err(PolicyError::Conflict(format!(
            "Consultation has already been {}",
            match decided {
                ConsultationStatus::Approved => "approved",
                _ => "rejected",
            }
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consultations_are_decided_once() {
        use ConsultationStatus::*;
        assert_eq!(consultation_transition(Pending, Approved), Ok(Approved));
        assert_eq!(consultation_transition(Pending, Rejected), Ok(Rejected));
        assert!(matches!(consultation_transition(Pending, Pending), Err(PolicyError::Validation(_))));
        assert!(matches!(consultation_transition(Approved, Rejected), Err(PolicyError::Conflict(_))));
    }
}
