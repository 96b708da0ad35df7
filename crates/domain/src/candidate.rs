//! Import candidates and root identity with validated constructors.

use code_intake_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Validation failures for candidates and derived identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateError {
    /// Candidate path is empty after normalization.
    EmptyPath {
        /// Length of the raw input before normalization.
        input_length: usize,
    },
    /// Candidate path is absolute (or drive-letter prefixed).
    AbsolutePath {
        /// Normalized input that failed validation.
        input: String,
    },
    /// Candidate path contains a `..` traversal segment.
    PathTraversal {
        /// Normalized input that failed validation.
        input: String,
    },
    /// Derived import-root id is invalid (invariant violation).
    DerivedRootIdInvalid {
        /// Candidate id that failed validation.
        candidate: String,
    },
}

impl CandidateError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyPath { .. } | Self::AbsolutePath { .. } | Self::PathTraversal { .. } => {
                ErrorCode::new("domain", "invalid_candidate_path")
            },
            Self::DerivedRootIdInvalid { .. } => ErrorCode::new("domain", "invalid_root_id"),
        }
    }

    const fn is_invariant(&self) -> bool {
        matches!(self, Self::DerivedRootIdInvalid { .. })
    }
}

impl fmt::Display for CandidateError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPath { .. } => formatter.write_str("candidate path must be non-empty"),
            Self::AbsolutePath { .. } => formatter.write_str("candidate path must be relative"),
            Self::PathTraversal { .. } => {
                formatter.write_str("candidate path must not contain `..` segments")
            },
            Self::DerivedRootIdInvalid { .. } => {
                formatter.write_str("derived import-root id is invalid (this is a bug)")
            },
        }
    }
}

impl std::error::Error for CandidateError {}

impl From<CandidateError> for ErrorEnvelope {
    fn from(error: CandidateError) -> Self {
        let mut envelope = if error.is_invariant() {
            Self::invariant(error.error_code(), error.to_string())
        } else {
            Self::expected(error.error_code(), error.to_string())
        };

        match error {
            CandidateError::EmptyPath { input_length } => {
                envelope = envelope.with_metadata("input_length", input_length.to_string());
            },
            CandidateError::AbsolutePath { input } | CandidateError::PathTraversal { input } => {
                envelope = envelope.with_metadata("input", input);
            },
            CandidateError::DerivedRootIdInvalid { candidate } => {
                envelope = envelope.with_metadata("candidate", candidate);
            },
        }

        envelope
    }
}

/// A file candidate relative to the import root.
///
/// The path uses `/` separators and `name` is always the final path
/// segment. Candidates are immutable once produced by the file reader.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    relative_path: Box<str>,
    name: Box<str>,
}

impl Candidate {
    /// Parse a candidate from an untrusted relative path.
    ///
    /// Separators are normalized to `/`, repeated and trailing separators
    /// collapse, `.` segments are dropped, and the basename is derived from
    /// the final segment. Absolute and traversing paths are rejected.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, CandidateError> {
        let raw = input.as_ref();
        let normalized = normalize_candidate_path(raw)?;
        let name = normalized
            .rsplit('/')
            .next()
            .unwrap_or(normalized.as_str())
            .to_owned();

        Ok(Self {
            relative_path: normalized.into_boxed_str(),
            name: name.into_boxed_str(),
        })
    }

    /// Path relative to the import root, `/`-separated.
    #[must_use]
    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    /// Final path segment.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.relative_path())
    }
}

fn normalize_candidate_path(raw: &str) -> Result<String, CandidateError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CandidateError::EmptyPath {
            input_length: raw.len(),
        });
    }

    let replaced = trimmed.replace('\\', "/");
    if is_absolute_like(&replaced) {
        return Err(CandidateError::AbsolutePath { input: replaced });
    }

    let segments: Vec<&str> = replaced
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect();
    if segments.is_empty() {
        return Err(CandidateError::EmptyPath {
            input_length: raw.len(),
        });
    }
    if segments.iter().any(|segment| *segment == "..") {
        return Err(CandidateError::PathTraversal { input: replaced });
    }

    Ok(segments.join("/"))
}

fn is_absolute_like(path: &str) -> bool {
    if path.starts_with('/') {
        return true;
    }
    let bytes = path.as_bytes();
    matches!(bytes, [drive, b':', ..] if drive.is_ascii_alphabetic())
}

/// Identifier for an import session root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImportRootId(Box<str>);

impl ImportRootId {
    /// Parse an `ImportRootId` from user input.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, CandidateError> {
        let raw = input.as_ref();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CandidateError::EmptyPath {
                input_length: raw.len(),
            });
        }

        Ok(Self(trimmed.to_owned().into_boxed_str()))
    }

    /// Access the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the underlying string.
    #[must_use]
    pub fn into_inner(self) -> Box<str> {
        self.0
    }
}

impl AsRef<str> for ImportRootId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ImportRootId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Derive a deterministic import-root identifier from a path.
pub fn derive_import_root_id(root: impl AsRef<Path>) -> Result<ImportRootId, CandidateError> {
    let normalized = normalize_root_path(root.as_ref());
    let digest = md5::compute(normalized.as_bytes());
    let hash = format!("{digest:x}");
    let hash_prefix: String = hash.chars().take(12).collect();
    let candidate = format!("import_{hash_prefix}");

    ImportRootId::parse(candidate.as_str())
        .map_err(|_| CandidateError::DerivedRootIdInvalid { candidate })
}

fn normalize_root_path(root: &Path) -> String {
    let raw = root.to_string_lossy().replace('\\', "/");
    let trimmed = raw.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_owned()
    } else {
        trimmed.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_derives_name_from_final_segment() {
        let candidate = Candidate::parse("src/lib.rs").ok();
        assert_eq!(
            candidate.as_ref().map(Candidate::relative_path),
            Some("src/lib.rs")
        );
        assert_eq!(candidate.as_ref().map(Candidate::name), Some("lib.rs"));
    }

    #[test]
    fn parse_normalizes_separators_and_dot_segments() {
        let candidate = Candidate::parse("./src\\nested//mod.rs").ok();
        assert_eq!(
            candidate.as_ref().map(Candidate::relative_path),
            Some("src/nested/mod.rs")
        );
        assert_eq!(candidate.as_ref().map(Candidate::name), Some("mod.rs"));
    }

    #[test]
    fn parse_rejects_empty_absolute_and_traversal() {
        assert!(matches!(
            Candidate::parse("   "),
            Err(CandidateError::EmptyPath { .. })
        ));
        assert!(matches!(
            Candidate::parse("/etc/passwd"),
            Err(CandidateError::AbsolutePath { .. })
        ));
        assert!(matches!(
            Candidate::parse("C:\\repo\\main.rs"),
            Err(CandidateError::AbsolutePath { .. })
        ));
        assert!(matches!(
            Candidate::parse("src/../secret"),
            Err(CandidateError::PathTraversal { .. })
        ));
    }

    #[test]
    fn candidate_errors_convert_to_envelopes_with_metadata() {
        let Err(error) = Candidate::parse("/abs") else {
            unreachable!("absolute path must fail");
        };
        let envelope = ErrorEnvelope::from(error);
        assert_eq!(
            envelope.code,
            ErrorCode::new("domain", "invalid_candidate_path")
        );
        assert_eq!(
            envelope.metadata.get("input").map(String::as_str),
            Some("/abs")
        );
    }

    #[test]
    fn root_id_derivation_is_deterministic() {
        let first = derive_import_root_id("/work/repo").ok();
        let second = derive_import_root_id("/work/repo/").ok();
        assert!(first.is_some());
        assert_eq!(first, second);
        assert!(
            first
                .as_ref()
                .is_some_and(|id| id.as_str().starts_with("import_"))
        );

        let other = derive_import_root_id("/work/other").ok();
        assert!(other.is_some());
        assert_ne!(first, other);
    }

    proptest! {
        #[test]
        fn parse_is_idempotent(raw in "[a-z]{1,8}(/[a-z0-9._-]{1,8}){0,4}") {
            if let Ok(candidate) = Candidate::parse(&raw) {
                let reparsed = Candidate::parse(candidate.relative_path()).ok();
                prop_assert_eq!(Some(candidate), reparsed);
            }
        }

        #[test]
        fn parsed_name_is_final_segment(raw in "[a-z]{1,8}(/[a-z0-9._-]{1,8}){0,4}") {
            if let Ok(candidate) = Candidate::parse(&raw) {
                prop_assert!(candidate.relative_path().ends_with(candidate.name()));
                prop_assert!(!candidate.name().contains('/'));
            }
        }
    }
}
