//! Extension tokens and tallies over allowed candidates.

use crate::Candidate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Sentinel token for candidates whose name carries no extension.
pub const NO_EXTENSION_TOKEN: &str = "no-ext";

/// Failure to parse an extension token from user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionTokenError {
    /// Input that failed validation.
    pub input: String,
}

impl fmt::Display for ExtensionTokenError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "extension token must be `{NO_EXTENSION_TOKEN}` or a dot-prefixed suffix, got {:?}",
            self.input
        )
    }
}

impl std::error::Error for ExtensionTokenError {}

/// Normalized extension token: lower-cased, dot-prefixed, or the
/// [`NO_EXTENSION_TOKEN`] sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionToken(Box<str>);

impl ExtensionToken {
    /// The sentinel token for extension-less names.
    #[must_use]
    pub fn no_extension() -> Self {
        Self(NO_EXTENSION_TOKEN.into())
    }

    /// Token for a candidate basename.
    ///
    /// The token is the substring after the last `.`, lower-cased and
    /// dot-prefixed. Names without a `.` (or ending in one) take the
    /// sentinel token.
    #[must_use]
    pub fn of_name(name: &str) -> Self {
        match name.rsplit_once('.') {
            Some((_, suffix)) if !suffix.is_empty() => {
                Self(format!(".{}", suffix.to_ascii_lowercase()).into_boxed_str())
            },
            _ => Self::no_extension(),
        }
    }

    /// Parse a token from user input (config override or CLI flag).
    ///
    /// Accepts `rs`, `.rs`, `.RS` and the sentinel; rejects empty input and
    /// anything containing a separator.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, ExtensionTokenError> {
        let trimmed = input.as_ref().trim();
        if trimmed == NO_EXTENSION_TOKEN {
            return Ok(Self::no_extension());
        }

        let suffix = trimmed.trim_start_matches('.');
        if suffix.is_empty() || suffix.contains('/') || suffix.contains('.') {
            return Err(ExtensionTokenError {
                input: input.as_ref().to_owned(),
            });
        }

        Ok(Self(format!(".{}", suffix.to_ascii_lowercase()).into_boxed_str()))
    }

    /// Access the underlying token string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when this is the sentinel token.
    #[must_use]
    pub fn is_no_extension(&self) -> bool {
        self.as_str() == NO_EXTENSION_TOKEN
    }
}

impl fmt::Display for ExtensionToken {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// One row of the tally in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyRow {
    /// Extension token.
    pub token: ExtensionToken,
    /// Allowed candidates carrying the token.
    pub count: usize,
}

/// Count of allowed candidates per extension token.
///
/// A pure derivation: recomputed whenever the allowed set changes, never
/// mutated incrementally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionTally {
    counts: BTreeMap<ExtensionToken, usize>,
}

impl ExtensionTally {
    /// Tally the extensions of the provided candidates.
    #[must_use]
    pub fn from_candidates<'a>(candidates: impl IntoIterator<Item = &'a Candidate>) -> Self {
        let mut counts: BTreeMap<ExtensionToken, usize> = BTreeMap::new();
        for candidate in candidates {
            let token = ExtensionToken::of_name(candidate.name());
            *counts.entry(token).or_insert(0) += 1;
        }
        Self { counts }
    }

    /// Count for a single token (zero when absent).
    #[must_use]
    pub fn count(&self, token: &ExtensionToken) -> usize {
        self.counts.get(token).copied().unwrap_or(0)
    }

    /// Returns true when no candidate was tallied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of distinct tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Iterate the tallied tokens in token order.
    pub fn tokens(&self) -> impl Iterator<Item = &ExtensionToken> {
        self.counts.keys()
    }

    /// Rows in display order: descending count, then ascending token.
    #[must_use]
    pub fn rows(&self) -> Vec<TallyRow> {
        let mut rows: Vec<TallyRow> = self
            .counts
            .iter()
            .map(|(token, count)| TallyRow {
                token: token.clone(),
                count: *count,
            })
            .collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.token.cmp(&b.token)));
        rows
    }
}
