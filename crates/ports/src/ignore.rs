//! Ignore matcher boundary contracts.

use code_intake_domain::{DEFAULT_IGNORE_RULES, DEFAULT_SOURCE_NAME};
use code_intake_shared::Result;
use std::sync::Arc;

/// One ordered block of raw ignore rules.
///
/// Sources are applied in order (defaults first, discovered repository
/// rules last) so later rules can override earlier ones via negation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreSource {
    /// Source label for diagnostics (e.g. `defaults`, `.gitignore`).
    pub name: Box<str>,
    /// Newline-separated rules in `.gitignore` syntax.
    pub text: Box<str>,
}

impl IgnoreSource {
    /// Build a labeled pattern source.
    pub fn new(name: impl Into<Box<str>>, text: impl Into<Box<str>>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    /// The built-in default rules as the first-priority source.
    #[must_use]
    pub fn defaults() -> Self {
        Self::new(DEFAULT_SOURCE_NAME, DEFAULT_IGNORE_RULES)
    }
}

/// Boundary contract for ignore matching.
///
/// Implementations must be pure: the decision depends only on the compiled
/// rules and the path, with no I/O and no hidden state. A trailing `/` in
/// `relative_path` marks the path as a directory.
pub trait IgnorePort: Send + Sync {
    /// Returns true when the root-relative path should be ignored.
    fn is_ignored(&self, relative_path: &str) -> bool;

    /// Returns true when a later rule may re-include paths beneath an
    /// ignored directory. Walkers must not prune ignored directories then.
    /// Conservative default: assume re-inclusion is possible.
    fn has_negations(&self) -> bool {
        true
    }
}

/// Boundary contract for compiling pattern sources into a matcher.
pub trait IgnoreCompilerPort: Send + Sync {
    /// Compile ordered sources into a matcher; later sources win.
    fn compile(&self, sources: &[IgnoreSource]) -> Result<Arc<dyn IgnorePort>>;
}
