//! # code-intake-ports
//!
//! Port traits for the code-intake hexagonal architecture.
//!
//! This crate defines the interfaces between the domain and infrastructure
//! layers. It depends only on `domain` and `shared`.

use std::future::Future;
use std::pin::Pin;

/// Boxed future used by port traits.
///
/// We deliberately use boxed futures for boundary traits (I/O-bound work);
/// the pure matcher contract stays synchronous.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Returns the ports crate version.
#[must_use]
pub const fn ports_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub mod filesystem;
pub mod ignore;
pub mod logger;
pub mod store;

pub use filesystem::*;
pub use ignore::*;
pub use logger::*;
pub use store::*;

// Re-export selected domain types used in port signatures, so adapter crates
// can implement ports without directly depending on `code-intake-domain`.
pub use code_intake_domain::{Candidate, ImportRootId};
