pub(crate) mod access;
pub(crate) mod consultations;
pub(crate) mod errors;
pub(crate) mod grouping;
pub(crate) mod mailer;
pub(crate) mod milestones;
pub(crate) mod notifications;
pub(crate) mod ownership;
pub(crate) mod storage;
pub(crate) mod supervision;
