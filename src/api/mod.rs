pub(crate) mod announcements;
pub(crate) mod auth;
pub(crate) mod consultations;
pub(crate) mod documents;
pub(crate) mod errors;
pub(crate) mod feedback;
pub(crate) mod groups;
pub(crate) mod guards;
pub(crate) mod handlers;
pub(crate) mod milestones;
pub(crate) mod notifications;
pub(crate) mod pagination;
pub(crate) mod projects;
pub(crate) mod reference;
pub(crate) mod repository;
pub(crate) mod router;
pub(crate) mod stages;
pub(crate) mod students;
pub(crate) mod supervision;
pub(crate) mod supervisors;
pub(crate) mod validation;
