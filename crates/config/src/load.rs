//! Config loading helpers (env + file + overrides).
//!
//! The loader is responsible for deterministic merge order and surfacing
//! user-facing errors as typed `ErrorEnvelope`s.

use crate::env::{IntakeEnv, apply_env_overrides};
use crate::schema::{IntakeConfig, ValidatedIntakeConfig};
use code_intake_shared::{ErrorClass, ErrorCode, ErrorEnvelope};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Json,
    Toml,
}

/// Partial config accepted as an overrides payload (all fields optional).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
struct IntakeConfigOverrides {
    ignore_file_name: Option<String>,
    extra_ignore_patterns: Option<Vec<String>>,
    selection_override: Option<Vec<String>>,
    max_files: Option<u32>,
    max_file_size_bytes: Option<u64>,
}

/// Load the intake config from an optional file path.
///
/// Precedence (highest wins):
/// - env overrides (`IntakeEnv`)
/// - overrides JSON (partial config)
/// - config file content (JSON or TOML by extension)
/// - defaults (`IntakeConfig::default()`)
pub fn load_intake_config_from_path(
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
    env: &IntakeEnv,
) -> Result<ValidatedIntakeConfig, ErrorEnvelope> {
    let mut config = match config_path {
        None => IntakeConfig::default(),
        Some(path) => {
            let config_text = read_config_file(path)?;
            let format = detect_config_format(path)?;
            parse_config_unvalidated(&config_text, format)?
        },
    };

    if let Some(input) = overrides_json {
        let overrides = parse_overrides_json(input)?;
        apply_overrides(&mut config, overrides);
    }

    // env is applied last and also validates/normalizes the resulting config.
    apply_env_overrides(config, env)
}

/// Load the intake config from std env and an optional file path.
pub fn load_intake_config_std_env(
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
) -> Result<ValidatedIntakeConfig, ErrorEnvelope> {
    let env = IntakeEnv::from_std_env()?;
    load_intake_config_from_path(config_path, overrides_json, &env)
}

/// Serialize the config as deterministic pretty JSON (with trailing newline).
pub fn to_pretty_json(config: &IntakeConfig) -> Result<String, ErrorEnvelope> {
    let mut output = serde_json::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::internal(),
            format!("failed to serialize config: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    output.push('\n');
    Ok(output)
}

fn read_config_file(path: &Path) -> Result<String, ErrorEnvelope> {
    std::fs::read_to_string(path).map_err(|error| {
        ErrorEnvelope::from(error).with_metadata("path", path.display().to_string())
    })
}

fn detect_config_format(path: &Path) -> Result<ConfigFormat, ErrorEnvelope> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(ConfigFormat::Json),
        Some("toml") => Ok(ConfigFormat::Toml),
        _ => Err(ErrorEnvelope::expected(
            ErrorCode::invalid_input(),
            "config file must use a .json or .toml extension",
        )
        .with_metadata("path", path.display().to_string())),
    }
}

fn parse_config_unvalidated(
    input: &str,
    format: ConfigFormat,
) -> Result<IntakeConfig, ErrorEnvelope> {
    match format {
        ConfigFormat::Json => serde_json::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                format!("invalid JSON config: {error}"),
            )
        }),
        ConfigFormat::Toml => toml::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                format!("invalid TOML config: {error}"),
            )
        }),
    }
}

fn parse_overrides_json(input: &str) -> Result<IntakeConfigOverrides, ErrorEnvelope> {
    serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::invalid_input(),
            format!("invalid overrides JSON: {error}"),
        )
    })
}

fn apply_overrides(config: &mut IntakeConfig, overrides: IntakeConfigOverrides) {
    if let Some(value) = overrides.ignore_file_name {
        config.ignore_file_name = value;
    }
    if let Some(value) = overrides.extra_ignore_patterns {
        config.extra_ignore_patterns = value;
    }
    if let Some(value) = overrides.selection_override {
        config.selection_override = Some(value);
    }
    if let Some(value) = overrides.max_files {
        config.max_files = Some(value);
    }
    if let Some(value) = overrides.max_file_size_bytes {
        config.max_file_size_bytes = Some(value);
    }
}
