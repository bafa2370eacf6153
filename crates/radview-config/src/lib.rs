#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Client configuration for the Radview report service.
//!
//! Layout: `model.rs` (raw settings and the validated `ClientConfig`),
//! `validate.rs` (field parsing), `defaults.rs` (fallback values),
//! `error.rs` (`ConfigError`).

pub mod defaults;
pub mod error;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use model::{ClientConfig, ClientSettings};
