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

//! Telemetry primitives shared across the Radview workspace.
//!
//! Layout: `init.rs` (subscriber installation and log format selection),
//! `context.rs` (per-invocation spans).

pub mod context;
pub mod init;

pub use context::invocation_span;
pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, UnknownLogFormat, init_logging};
