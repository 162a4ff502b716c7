pub(crate) mod auth;
pub(crate) mod encode;
#[cfg(test)]
pub(crate) mod testing;
