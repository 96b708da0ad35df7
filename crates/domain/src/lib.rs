//! # code-intake-domain
//!
//! Domain entities, primitives, and value objects for folder import.
//!
//! This crate contains the core domain model with no infrastructure dependencies:
//!
//! - **Candidates** - `Candidate`, `ImportRootId`
//! - **Extensions** - `ExtensionToken`, `ExtensionTally`
//! - **Selection** - `SelectionSet`, `resolve_import_set`, `ImportSummary`
//! - **Defaults** - the built-in ignore rule block
//!
//! ## Dependency Rules
//!
//! - Depends only on `shared` crate
//! - No infrastructure or adapter dependencies
//! - Pure domain logic with no I/O

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

// Re-export shared types for convenience
pub use code_intake_shared::shared_crate_version;

pub mod candidate;
pub mod extensions;
pub mod ignore_defaults;
pub mod selection;

pub use candidate::{Candidate, CandidateError, ImportRootId, derive_import_root_id};
pub use extensions::{
    ExtensionTally, ExtensionToken, ExtensionTokenError, NO_EXTENSION_TOKEN, TallyRow,
};
pub use ignore_defaults::{DEFAULT_IGNORE_RULES, DEFAULT_SOURCE_NAME, default_rule_count};
pub use selection::{
    DEFAULT_SELECTION_EXTENSIONS, ImportSummary, SelectionSet, resolve_import_set,
};

/// Returns the domain crate version.
#[must_use]
pub const fn domain_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_crate_compiles() {
        let version = domain_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn domain_depends_on_shared() {
        let shared_version = shared_crate_version();
        assert!(!shared_version.is_empty());
    }
}
