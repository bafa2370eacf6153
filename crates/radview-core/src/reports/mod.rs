//! Report view models: the paginated listing and the single-report editor.

pub mod detail;
pub mod list;
