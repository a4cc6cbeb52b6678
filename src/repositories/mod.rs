pub(crate) mod announcements;
pub(crate) mod consultations;
pub(crate) mod documents;
pub(crate) mod feedback;
pub(crate) mod file_repository;
pub(crate) mod groups;
pub(crate) mod health;
pub(crate) mod milestones;
pub(crate) mod notifications;
pub(crate) mod projects;
pub(crate) mod reference;
pub(crate) mod stages;
pub(crate) mod students;
pub(crate) mod users;
