use std::collections::HashMap;

use sqlx::PgPool;
use thiserror::Error;

use crate::db::models::{ProjectGroup, Student};
use crate::db::types::OwnerKind;
use crate::repositories;
use crate::services::errors::PolicyError;

/// Reference to whoever owns a document, project or feedback entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum OwnerRef {
    Student(i64),
    Group(i64),
}

impl OwnerRef {
    /// Parses a wire tag; unknown tags resolve to nothing, so they surface as not found.
    pub(crate) fn parse(tag: &str, id: i64) -> Result<Self, PolicyError> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(OwnerRef::Student(id)),
            "group" | "projectgroup" => Ok(OwnerRef::Group(id)),
            other => Err(PolicyError::NotFound(format!("Unknown owner type '{other}'"))),
        }
    }

    pub(crate) fn from_parts(kind: OwnerKind, id: i64) -> Self {
        match kind {
            OwnerKind::Student => OwnerRef::Student(id),
            OwnerKind::Group => OwnerRef::Group(id),
        }
    }

    pub(crate) fn into_parts(self) -> (OwnerKind, i64) {
        match self {
            OwnerRef::Student(id) => (OwnerKind::Student, id),
            OwnerRef::Group(id) => (OwnerKind::Group, id),
        }
    }

    pub(crate) fn kind(self) -> OwnerKind {
        self.into_parts().0
    }

    pub(crate) fn id(self) -> i64 {
        self.into_parts().1
    }

    /// Builds a reference from an "exactly one of" column pair.
    pub(crate) fn exclusive(student_id: Option<i64>, group_id: Option<i64>) -> Result<Self, PolicyError> {
        match (student_id, group_id) {
            (Some(student_id), None) => Ok(OwnerRef::Student(student_id)),
            (None, Some(group_id)) => Ok(OwnerRef::Group(group_id)),
            (Some(_), Some(_)) => Err(PolicyError::Validation(
                "Only one of student or group may be set".to_string(),
            )),
            (None, None) => {
                Err(PolicyError::Validation("Either student or group must be set".to_string()))
            }
        }
    }

    pub(crate) fn student_id(self) -> Option<i64> {
        match self {
            OwnerRef::Student(id) => Some(id),
            OwnerRef::Group(_) => None,
        }
    }

    pub(crate) fn group_id(self) -> Option<i64> {
        match self {
            OwnerRef::Group(id) => Some(id),
            OwnerRef::Student(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Owner {
    Student(Student),
    Group(ProjectGroup),
}

impl Owner {
    pub(crate) fn owner_ref(&self) -> OwnerRef {
        match self {
            Owner::Student(student) => OwnerRef::Student(student.id),
            Owner::Group(group) => OwnerRef::Group(group.id),
        }
    }

    pub(crate) fn display_name(&self) -> &str {
        match self {
            Owner::Student(student) => &student.full_name,
            Owner::Group(group) => &group.name,
        }
    }

    pub(crate) fn supervisor_id(&self) -> Option<i64> {
        match self {
            Owner::Student(student) => student.supervisor_id,
            Owner::Group(group) => group.supervisor_id,
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum ResolveError {
    #[error("owner {0:?} not found")]
    NotFound(OwnerRef),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub(crate) async fn resolve(
    executor: impl sqlx::PgExecutor<'_>,
    owner: OwnerRef,
) -> Result<Owner, ResolveError> {
    let resolved = match owner {
        OwnerRef::Student(id) => {
            repositories::students::find_by_id(executor, id).await?.map(Owner::Student)
        }
        OwnerRef::Group(id) => {
            repositories::groups::find_by_id(executor, id).await?.map(Owner::Group)
        }
    };

    resolved.ok_or(ResolveError::NotFound(owner))
}

/// Batch lookup of display names for list views. Missing owners are simply absent.
pub(crate) async fn display_names(
    pool: &PgPool,
    refs: &[OwnerRef],
) -> Result<HashMap<OwnerRef, String>, sqlx::Error> {
    let student_ids: Vec<i64> = refs.iter().filter_map(|owner| owner.student_id()).collect();
    let group_ids: Vec<i64> = refs.iter().filter_map(|owner| owner.group_id()).collect();

    let mut names = HashMap::with_capacity(refs.len());

    if !student_ids.is_empty() {
        for (id, name) in repositories::students::names_by_ids(pool, &student_ids).await? {
            names.insert(OwnerRef::Student(id), name);
        }
    }
    if !group_ids.is_empty() {
        for (id, name) in repositories::groups::names_by_ids(pool, &group_ids).await? {
            names.insert(OwnerRef::Group(id), name);
        }
    }

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_parse_case_insensitively_with_group_alias() {
        assert_eq!(OwnerRef::parse("Student", 4), Ok(OwnerRef::Student(4)));
        assert_eq!(OwnerRef::parse("projectgroup", 9), Ok(OwnerRef::Group(9)));
        assert_eq!(OwnerRef::parse("group", 9), Ok(OwnerRef::Group(9)));
    }

    #[test]
    fn unknown_tag_is_not_found() {
        assert!(matches!(OwnerRef::parse("course", 1), Err(PolicyError::NotFound(_))));
    }

    #[test]
    fn exclusive_requires_exactly_one_target() {
        assert_eq!(OwnerRef::exclusive(Some(1), None), Ok(OwnerRef::Student(1)));
        assert_eq!(OwnerRef::exclusive(None, Some(2)), Ok(OwnerRef::Group(2)));
        assert!(matches!(OwnerRef::exclusive(Some(1), Some(2)), Err(PolicyError::Validation(_))));
        assert!(matches!(OwnerRef::exclusive(None, None), Err(PolicyError::Validation(_))));
    }

    #[test]
    fn parts_round_trip_through_the_stored_pair() {
        let owner = OwnerRef::Group(12);
        let (kind, id) = owner.into_parts();
        assert_eq!(kind, OwnerKind::Group);
        assert_eq!(OwnerRef::from_parts(kind, id), owner);
        assert_eq!(owner.student_id(), None);
        assert_eq!(owner.group_id(), Some(12));
    }
}
