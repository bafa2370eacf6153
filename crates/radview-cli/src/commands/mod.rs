//! Command handlers grouped by concern.

pub(crate) mod reports;
pub(crate) mod session;
pub(crate) mod templates;
