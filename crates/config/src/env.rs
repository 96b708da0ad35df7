//! Environment variable parsing and env-to-config merging.
//!
//! Env parsing is:
//! - strict (invalid values fail fast)
//! - deterministic (CSV selection lists normalize during validation)

use crate::schema::{IntakeConfig, ValidatedIntakeConfig, validate_intake_config};
use code_intake_shared::{ErrorCode, ErrorEnvelope};
use std::collections::BTreeMap;

/// Env var: discovered ignore file name.
pub const ENV_IGNORE_FILE_NAME: &str = "CODE_INTAKE_IGNORE_FILE_NAME";
/// Env var: extra ignore rules (CSV, order preserved).
pub const ENV_EXTRA_IGNORE_PATTERNS: &str = "CODE_INTAKE_EXTRA_IGNORE_PATTERNS";
/// Env var: selection override (CSV of extension tokens).
pub const ENV_SELECTION: &str = "CODE_INTAKE_SELECTION";
/// Env var: scan file limit.
pub const ENV_MAX_FILES: &str = "CODE_INTAKE_MAX_FILES";
/// Env var: delivery file size limit in bytes.
pub const ENV_MAX_FILE_SIZE_BYTES: &str = "CODE_INTAKE_MAX_FILE_SIZE_BYTES";

/// Parsed environment overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntakeEnv {
    /// Discovered ignore file name override.
    pub ignore_file_name: Option<String>,
    /// Extra ignore rules override.
    pub extra_ignore_patterns: Option<Vec<String>>,
    /// Selection override.
    pub selection_override: Option<Vec<String>>,
    /// Scan file limit override.
    pub max_files: Option<u32>,
    /// Delivery size limit override.
    pub max_file_size_bytes: Option<u64>,
}

impl IntakeEnv {
    /// Parse overrides from an explicit env map (tests, embedding hosts).
    pub fn from_map(env: &BTreeMap<String, String>) -> Result<Self, ErrorEnvelope> {
        let mut parsed = Self::default();

        if let Some(value) = non_empty(env.get(ENV_IGNORE_FILE_NAME)) {
            parsed.ignore_file_name = Some(value.to_owned());
        }
        if let Some(value) = non_empty(env.get(ENV_EXTRA_IGNORE_PATTERNS)) {
            parsed.extra_ignore_patterns = Some(split_csv(value));
        }
        if let Some(value) = non_empty(env.get(ENV_SELECTION)) {
            parsed.selection_override = Some(split_csv(value));
        }
        if let Some(value) = non_empty(env.get(ENV_MAX_FILES)) {
            parsed.max_files = Some(parse_number(ENV_MAX_FILES, value)?);
        }
        if let Some(value) = non_empty(env.get(ENV_MAX_FILE_SIZE_BYTES)) {
            parsed.max_file_size_bytes = Some(parse_number(ENV_MAX_FILE_SIZE_BYTES, value)?);
        }

        Ok(parsed)
    }

    /// Parse overrides from the process environment.
    pub fn from_std_env() -> Result<Self, ErrorEnvelope> {
        let env: BTreeMap<String, String> = std::env::vars().collect();
        Self::from_map(&env)
    }
}

/// Apply env overrides on top of a config, then validate the result.
///
/// Env is the highest-precedence source: it is applied last and the merged
/// config goes through full validation/normalization.
pub fn apply_env_overrides(
    mut config: IntakeConfig,
    env: &IntakeEnv,
) -> Result<ValidatedIntakeConfig, ErrorEnvelope> {
    if let Some(value) = env.ignore_file_name.as_ref() {
        config.ignore_file_name = value.clone();
    }
    if let Some(value) = env.extra_ignore_patterns.as_ref() {
        config.extra_ignore_patterns = value.clone();
    }
    if let Some(value) = env.selection_override.as_ref() {
        config.selection_override = Some(value.clone());
    }
    if let Some(value) = env.max_files {
        config.max_files = Some(value);
    }
    if let Some(value) = env.max_file_size_bytes {
        config.max_file_size_bytes = Some(value);
    }

    validate_intake_config(config).map_err(ErrorEnvelope::from)
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    let trimmed = value?.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_owned)
        .collect()
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ErrorEnvelope> {
    value.parse::<T>().map_err(|_| {
        ErrorEnvelope::expected(
            ErrorCode::invalid_input(),
            format!("{name} must be a positive integer"),
        )
        .with_metadata("value", value.to_owned())
    })
}
