use crate::db::models::User;
use crate::db::types::UserRole;
use crate::services::errors::PolicyError;

/// The single role a principal acts under for the lifetime of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    Admin,
    Supervisor,
    Student { student_id: i64 },
    Unassigned,
}

impl Role {
    /// A student role only counts when the account has a linked student profile.
    pub(crate) fn resolve(role: Option<UserRole>, student_id: Option<i64>) -> Self {
        match (role, student_id) {
            (Some(UserRole::Admin), _) => Role::Admin,
            (Some(UserRole::Supervisor), _) => Role::Supervisor,
            (Some(UserRole::Student), Some(student_id)) | (None, Some(student_id)) => {
                Role::Student { student_id }
            }
            _ => Role::Unassigned,
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Supervisor => "supervisor",
            Role::Student { .. } => "student",
            Role::Unassigned => "none",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Principal {
    pub(crate) user_id: i64,
    pub(crate) username: String,
    pub(crate) email: Option<String>,
    pub(crate) full_name: String,
    pub(crate) role: Role,
}

impl Principal {
    pub(crate) fn from_user(user: &User, student_id: Option<i64>) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role: Role::resolve(user.role, student_id),
        }
    }

    pub(crate) fn require_admin(&self) -> Result<(), PolicyError> {
        match self.role {
            Role::Admin => Ok(()),
            _ => Err(PolicyError::Forbidden("Admin access required")),
        }
    }

    /// Returns the supervisor's user id.
    pub(crate) fn require_supervisor(&self) -> Result<i64, PolicyError> {
        match self.role {
            Role::Supervisor => Ok(self.user_id),
            _ => Err(PolicyError::Forbidden("Supervisor access required")),
        }
    }

    /// Returns the caller's student profile id.
    pub(crate) fn require_student(&self) -> Result<i64, PolicyError> {
        match self.role {
            Role::Student { student_id } => Ok(student_id),
            _ => Err(PolicyError::Forbidden("Student access required")),
        }
    }

    pub(crate) fn require_staff(&self) -> Result<(), PolicyError> {
        match self.role {
            Role::Admin | Role::Supervisor => Ok(()),
            _ => Err(PolicyError::Forbidden("Admin or supervisor access required")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Role) -> Principal {
        Principal {
            user_id: 10,
            username: "someone".to_string(),
            email: None,
            full_name: "Some One".to_string(),
            role,
        }
    }

    #[test]
    fn role_resolution_prefers_explicit_staff_roles() {
        assert_eq!(Role::resolve(Some(UserRole::Admin), None), Role::Admin);
        assert_eq!(Role::resolve(Some(UserRole::Supervisor), None), Role::Supervisor);
        assert_eq!(
            Role::resolve(Some(UserRole::Student), Some(3)),
            Role::Student { student_id: 3 }
        );
        assert_eq!(Role::resolve(Some(UserRole::Student), None), Role::Unassigned);
        assert_eq!(Role::resolve(None, None), Role::Unassigned);
    }

    #[test]
    fn gates_accept_only_their_role() {
        let admin = principal(Role::Admin);
        let supervisor = principal(Role::Supervisor);
        let student = principal(Role::Student { student_id: 7 });
        let nobody = principal(Role::Unassigned);

        assert!(admin.require_admin().is_ok());
        assert!(supervisor.require_admin().is_err());
        assert_eq!(supervisor.require_supervisor(), Ok(10));
        assert!(admin.require_supervisor().is_err());
        assert_eq!(student.require_student(), Ok(7));
        assert!(admin.require_student().is_err());
        assert!(admin.require_staff().is_ok());
        assert!(supervisor.require_staff().is_ok());
        assert!(student.require_staff().is_err());
        assert!(matches!(nobody.require_staff(), Err(PolicyError::Forbidden(_))));
    }
}
