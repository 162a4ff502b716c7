pub(crate) mod approval;
pub(crate) mod repo;
pub(crate) mod request;
pub(crate) mod response;
