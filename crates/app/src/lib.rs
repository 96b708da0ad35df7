//! # code-intake-app
//!
//! Application use cases for folder import.
//! This crate depends on `ports`, `domain`, and `shared`.

pub mod import_session;

pub use import_session::{
    DeliverStageStats, FilterStageStats, ImportProgress, ImportSessionDeps, ImportSessionInput,
    ImportSessionOutput, ImportStageStats, ScanStageStats, import_session,
};

/// Returns the app crate version.
#[must_use]
pub const fn app_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use code_intake_domain::domain_crate_version;
    use code_intake_ports::ports_crate_version;
    use code_intake_shared::shared_crate_version;

    #[test]
    fn app_crate_compiles() {
        let version = app_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn app_can_use_ports_domain_shared() {
        let ports_version = ports_crate_version();
        let domain_version = domain_crate_version();
        let shared_version = shared_crate_version();

        assert!(!ports_version.is_empty());
        assert!(!domain_version.is_empty());
        assert!(!shared_version.is_empty());
    }
}
