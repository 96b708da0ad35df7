//! Intake configuration schema, defaults, validation, and normalization.
//!
//! Configuration parsing is deterministic and safe:
//! - Deserialization uses `serde` (JSON and TOML).
//! - Validation is manual and returns typed errors mapped to `ErrorEnvelope`.
//! - Normalization enforces stable ordering for set-like list fields;
//!   ignore pattern lists keep their order because rule order carries
//!   meaning (later rules override earlier ones).

use code_intake_domain::ExtensionToken;
use code_intake_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;

/// Current supported configuration schema version.
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Default name of the discovered repository ignore file.
pub const DEFAULT_IGNORE_FILE_NAME: &str = ".gitignore";

const MAX_FILES_MIN: u32 = 1;
const MAX_FILES_MAX: u32 = 1_000_000;
const MAX_FILE_SIZE_MIN_BYTES: u64 = 1;
const MAX_FILE_SIZE_MAX_BYTES: u64 = 1_000_000_000;

/// Typed validation failures for the intake config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSchemaError {
    /// Unsupported schema version.
    UnsupportedVersion {
        /// Version found in the input.
        version: u32,
    },
    /// Ignore file name is empty or not a single path segment.
    InvalidIgnoreFileName {
        /// Offending input.
        input: String,
    },
    /// `maxFiles` outside the supported bounds.
    MaxFilesOutOfBounds {
        /// Offending value.
        value: u32,
    },
    /// `maxFileSizeBytes` outside the supported bounds.
    MaxFileSizeOutOfBounds {
        /// Offending value.
        value: u64,
    },
    /// A selection override entry is not a valid extension token.
    InvalidSelectionToken {
        /// Offending input.
        input: String,
    },
}

impl fmt::Display for ConfigSchemaError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVersion { version } => {
                write!(
                    formatter,
                    "unsupported config version {version} (expected {CURRENT_CONFIG_VERSION})"
                )
            },
            Self::InvalidIgnoreFileName { .. } => {
                formatter.write_str("ignoreFileName must be a single non-empty path segment")
            },
            Self::MaxFilesOutOfBounds { value } => {
                write!(
                    formatter,
                    "maxFiles must be within {MAX_FILES_MIN}..={MAX_FILES_MAX}, got {value}"
                )
            },
            Self::MaxFileSizeOutOfBounds { value } => {
                write!(
                    formatter,
                    "maxFileSizeBytes must be within {MAX_FILE_SIZE_MIN_BYTES}..={MAX_FILE_SIZE_MAX_BYTES}, got {value}"
                )
            },
            Self::InvalidSelectionToken { input } => {
                write!(formatter, "selectionOverride entry {input:?} is not a valid extension token")
            },
        }
    }
}

impl std::error::Error for ConfigSchemaError {}

impl From<ConfigSchemaError> for ErrorEnvelope {
    fn from(error: ConfigSchemaError) -> Self {
        let envelope = Self::expected(ErrorCode::invalid_input(), error.to_string());
        match error {
            ConfigSchemaError::UnsupportedVersion { version } => {
                envelope.with_metadata("version", version.to_string())
            },
            ConfigSchemaError::InvalidIgnoreFileName { input }
            | ConfigSchemaError::InvalidSelectionToken { input } => {
                envelope.with_metadata("input", input)
            },
            ConfigSchemaError::MaxFilesOutOfBounds { value } => {
                envelope.with_metadata("value", value.to_string())
            },
            ConfigSchemaError::MaxFileSizeOutOfBounds { value } => {
                envelope.with_metadata("value", value.to_string())
            },
        }
    }
}

/// Intake configuration as read from a file (unvalidated).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct IntakeConfig {
    /// Schema version.
    pub version: u32,
    /// Name of the discovered repository ignore file.
    pub ignore_file_name: String,
    /// Extra ignore rules applied between the defaults and the discovered
    /// file. Order is preserved.
    pub extra_ignore_patterns: Vec<String>,
    /// Optional explicit extension selection replacing the default one.
    pub selection_override: Option<Vec<String>>,
    /// Maximum number of files the scan may produce.
    pub max_files: Option<u32>,
    /// Files larger than this are skipped at delivery time.
    pub max_file_size_bytes: Option<u64>,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_CONFIG_VERSION,
            ignore_file_name: DEFAULT_IGNORE_FILE_NAME.to_owned(),
            extra_ignore_patterns: Vec::new(),
            selection_override: None,
            max_files: None,
            max_file_size_bytes: None,
        }
    }
}

/// Validated and normalized intake configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedIntakeConfig {
    config: IntakeConfig,
    selection_override: Option<Vec<ExtensionToken>>,
}

impl ValidatedIntakeConfig {
    /// The underlying normalized config.
    #[must_use]
    pub const fn config(&self) -> &IntakeConfig {
        &self.config
    }

    /// Discovered ignore file name.
    #[must_use]
    pub fn ignore_file_name(&self) -> &str {
        &self.config.ignore_file_name
    }

    /// Extra ignore rules in declaration order.
    #[must_use]
    pub fn extra_ignore_patterns(&self) -> &[String] {
        &self.config.extra_ignore_patterns
    }

    /// Parsed selection override tokens (sorted, deduplicated).
    #[must_use]
    pub fn selection_override(&self) -> Option<&[ExtensionToken]> {
        self.selection_override.as_deref()
    }

    /// Scan file limit.
    #[must_use]
    pub fn max_files(&self) -> Option<NonZeroUsize> {
        self.config
            .max_files
            .and_then(|value| usize::try_from(value).ok())
            .and_then(NonZeroUsize::new)
    }

    /// Delivery file size limit.
    #[must_use]
    pub const fn max_file_size_bytes(&self) -> Option<u64> {
        self.config.max_file_size_bytes
    }
}

/// Validate and normalize an intake config.
pub fn validate_intake_config(
    mut config: IntakeConfig,
) -> Result<ValidatedIntakeConfig, ConfigSchemaError> {
    if config.version != CURRENT_CONFIG_VERSION {
        return Err(ConfigSchemaError::UnsupportedVersion {
            version: config.version,
        });
    }

    let ignore_file_name = config.ignore_file_name.trim();
    if ignore_file_name.is_empty() || ignore_file_name.contains('/') {
        return Err(ConfigSchemaError::InvalidIgnoreFileName {
            input: config.ignore_file_name,
        });
    }
    config.ignore_file_name = ignore_file_name.to_owned();

    config.extra_ignore_patterns = config
        .extra_ignore_patterns
        .iter()
        .map(|pattern| pattern.trim().to_owned())
        .filter(|pattern| !pattern.is_empty())
        .collect();

    if let Some(value) = config.max_files
        && !(MAX_FILES_MIN..=MAX_FILES_MAX).contains(&value)
    {
        return Err(ConfigSchemaError::MaxFilesOutOfBounds { value });
    }
    if let Some(value) = config.max_file_size_bytes
        && !(MAX_FILE_SIZE_MIN_BYTES..=MAX_FILE_SIZE_MAX_BYTES).contains(&value)
    {
        return Err(ConfigSchemaError::MaxFileSizeOutOfBounds { value });
    }

    let selection_override = match config.selection_override.as_ref() {
        None => None,
        Some(entries) => {
            let mut tokens = Vec::with_capacity(entries.len());
            for entry in entries {
                let token = ExtensionToken::parse(entry).map_err(|_| {
                    ConfigSchemaError::InvalidSelectionToken {
                        input: entry.clone(),
                    }
                })?;
                tokens.push(token);
            }
            tokens.sort();
            tokens.dedup();
            Some(tokens)
        },
    };

    Ok(ValidatedIntakeConfig {
        config,
        selection_override,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let validated = validate_intake_config(IntakeConfig::default()).expect("default is valid");
        assert_eq!(validated.ignore_file_name(), DEFAULT_IGNORE_FILE_NAME);
        assert!(validated.selection_override().is_none());
        assert!(validated.max_files().is_none());
    }

    #[test]
    fn rejects_unknown_version() {
        let config = IntakeConfig {
            version: 99,
            ..IntakeConfig::default()
        };
        assert!(matches!(
            validate_intake_config(config),
            Err(ConfigSchemaError::UnsupportedVersion { version: 99 })
        ));
    }

    #[test]
    fn rejects_ignore_file_name_with_separator() {
        let config = IntakeConfig {
            ignore_file_name: "nested/.gitignore".to_owned(),
            ..IntakeConfig::default()
        };
        assert!(matches!(
            validate_intake_config(config),
            Err(ConfigSchemaError::InvalidIgnoreFileName { .. })
        ));
    }

    #[test]
    fn normalizes_extra_patterns_preserving_order() {
        let config = IntakeConfig {
            extra_ignore_patterns: vec![
                " *.tmp ".to_owned(),
                String::new(),
                "!keep.tmp".to_owned(),
            ],
            ..IntakeConfig::default()
        };
        let validated = validate_intake_config(config).expect("valid");
        assert_eq!(
            validated.extra_ignore_patterns(),
            &["*.tmp".to_owned(), "!keep.tmp".to_owned()]
        );
    }

    #[test]
    fn selection_override_is_sorted_and_deduped() {
        let config = IntakeConfig {
            selection_override: Some(vec![
                "rs".to_owned(),
                ".py".to_owned(),
                ".RS".to_owned(),
            ]),
            ..IntakeConfig::default()
        };
        let validated = validate_intake_config(config).expect("valid");
        let tokens: Vec<&str> = validated
            .selection_override()
            .expect("override present")
            .iter()
            .map(ExtensionToken::as_str)
            .collect();
        assert_eq!(tokens, vec![".py", ".rs"]);
    }

    #[test]
    fn bounds_are_enforced() {
        let config = IntakeConfig {
            max_files: Some(0),
            ..IntakeConfig::default()
        };
        assert!(matches!(
            validate_intake_config(config),
            Err(ConfigSchemaError::MaxFilesOutOfBounds { value: 0 })
        ));

        let config = IntakeConfig {
            max_file_size_bytes: Some(0),
            ..IntakeConfig::default()
        };
        assert!(validate_intake_config(config).is_err());
    }

    #[test]
    fn schema_errors_map_to_envelopes() {
        let error = ConfigSchemaError::InvalidSelectionToken {
            input: "a/b".to_owned(),
        };
        let envelope = ErrorEnvelope::from(error);
        assert_eq!(envelope.code, ErrorCode::invalid_input());
        assert_eq!(
            envelope.metadata.get("input").map(String::as_str),
            Some("a/b")
        );
    }
}
