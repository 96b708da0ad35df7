//! # code-intake-config
//!
//! Configuration schema, validation, and normalization logic for intake
//! hosts and the CLI. This crate depends on `domain` and `shared` only.

/// Environment variable parsing and merging.
pub mod env;
/// Config loading helpers (env + file + overrides).
pub mod load;
/// Configuration schema types and helpers.
pub mod schema;

pub use env::{
    ENV_EXTRA_IGNORE_PATTERNS, ENV_IGNORE_FILE_NAME, ENV_MAX_FILE_SIZE_BYTES, ENV_MAX_FILES,
    ENV_SELECTION, IntakeEnv, apply_env_overrides,
};
pub use load::{load_intake_config_from_path, load_intake_config_std_env, to_pretty_json};
pub use schema::{
    CURRENT_CONFIG_VERSION, ConfigSchemaError, DEFAULT_IGNORE_FILE_NAME, IntakeConfig,
    ValidatedIntakeConfig, validate_intake_config,
};

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
