//! # code-intake-adapters
//!
//! Adapter implementations for ports (gitignore matching, filesystem,
//! logging, project stores). This crate depends on `ports`, `domain`, and
//! `shared`.

pub mod fs;
pub mod gitignore;
pub mod log_sink;
pub mod logger;
pub mod store;

pub use fs::{LocalFileSystem, LocalPathPolicy};
pub use gitignore::{GitignoreCompiler, GitignoreMatcher, IgnoreDecision};
pub use log_sink::{LogSink, MemorySink, StderrSink};
pub use logger::JsonLogger;
pub use store::{JsonlProjectStore, MemoryProjectStore};

/// Returns the adapters crate version.
#[must_use]
pub const fn adapters_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
