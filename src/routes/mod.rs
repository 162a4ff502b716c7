pub(crate) mod admin;
pub(crate) mod auth;
pub(crate) mod projects;
pub(crate) mod router;
