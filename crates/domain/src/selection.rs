//! Extension selection sets and import-set resolution.

use crate::{Candidate, ExtensionTally, ExtensionToken};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Curated allow-list of common source/config extensions used for the
/// default selection. Fixed: not user-configurable, so hosts get identical
/// default behavior for identical inputs.
pub const DEFAULT_SELECTION_EXTENSIONS: &[&str] = &[
    ".rs", ".py", ".js", ".ts", ".tsx", ".jsx", ".go", ".java", ".c", ".h", ".cpp", ".hpp", ".cs",
    ".rb", ".php", ".swift", ".kt", ".scala", ".sh", ".sql", ".html", ".css", ".vue", ".svelte",
    ".json", ".yaml", ".yml", ".toml", ".md",
];

/// The set of extension tokens the caller has opted into.
///
/// User-mutable session state: toggling a token never touches the upstream
/// candidates or the tally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionSet {
    tokens: BTreeSet<ExtensionToken>,
}

impl SelectionSet {
    /// Build a selection from explicit tokens.
    #[must_use]
    pub fn from_tokens(tokens: impl IntoIterator<Item = ExtensionToken>) -> Self {
        Self {
            tokens: tokens.into_iter().collect(),
        }
    }

    /// Default selection: the intersection of
    /// [`DEFAULT_SELECTION_EXTENSIONS`] with the tokens present in `tally`.
    #[must_use]
    pub fn default_for(tally: &ExtensionTally) -> Self {
        let allow_list: BTreeSet<&str> = DEFAULT_SELECTION_EXTENSIONS.iter().copied().collect();
        Self {
            tokens: tally
                .tokens()
                .filter(|token| allow_list.contains(token.as_str()))
                .cloned()
                .collect(),
        }
    }

    /// Returns true when the token is selected.
    #[must_use]
    pub fn contains(&self, token: &ExtensionToken) -> bool {
        self.tokens.contains(token)
    }

    /// Add a token to the selection.
    pub fn insert(&mut self, token: ExtensionToken) {
        self.tokens.insert(token);
    }

    /// Remove a token from the selection; returns true when it was present.
    pub fn remove(&mut self, token: &ExtensionToken) -> bool {
        self.tokens.remove(token)
    }

    /// Flip a token's membership.
    pub fn toggle(&mut self, token: ExtensionToken) {
        if !self.tokens.remove(&token) {
            self.tokens.insert(token);
        }
    }

    /// Iterate the selected tokens in token order.
    pub fn tokens(&self) -> impl Iterator<Item = &ExtensionToken> {
        self.tokens.iter()
    }

    /// Returns true when nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Number of selected tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }
}

/// Allowed candidates whose extension token is selected, preserving the
/// original relative order.
#[must_use]
pub fn resolve_import_set(allowed: &[Candidate], selection: &SelectionSet) -> Vec<Candidate> {
    allowed
        .iter()
        .filter(|candidate| selection.contains(&ExtensionToken::of_name(candidate.name())))
        .cloned()
        .collect()
}

/// Summary counters for the host's import dialog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Candidates surviving ignore filtering.
    pub allowed_count: usize,
    /// Candidates excluded by ignore rules.
    pub ignored_count: usize,
    /// Allowed candidates whose extension is selected.
    pub to_import_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(paths: &[&str]) -> Vec<Candidate> {
        let parsed: Vec<Candidate> = paths
            .iter()
            .filter_map(|path| Candidate::parse(path).ok())
            .collect();
        assert_eq!(parsed.len(), paths.len(), "all test paths must parse");
        parsed
    }

    #[test]
    fn default_selection_intersects_allow_list_with_tally() {
        let allowed = candidates(&["a.rs", "b.py", "c.bin", "README"]);
        let tally = ExtensionTally::from_candidates(&allowed);
        let selection = SelectionSet::default_for(&tally);

        let tokens: Vec<&str> = selection.tokens().map(ExtensionToken::as_str).collect();
        assert_eq!(tokens, vec![".py", ".rs"]);
    }

    #[test]
    fn resolve_preserves_original_order() {
        let allowed = candidates(&["a.rs", "b.py", "c.bin", "README"]);
        let tally = ExtensionTally::from_candidates(&allowed);
        let selection = SelectionSet::default_for(&tally);

        let resolved = resolve_import_set(&allowed, &selection);
        let paths: Vec<&str> = resolved
            .iter()
            .map(|candidate| candidate.relative_path())
            .collect();
        assert_eq!(paths, vec!["a.rs", "b.py"]);
    }

    #[test]
    fn empty_selection_resolves_to_nothing() {
        let allowed = candidates(&["a.rs", "b.py"]);
        let resolved = resolve_import_set(&allowed, &SelectionSet::default());
        assert!(resolved.is_empty());
    }

    #[test]
    fn toggle_flips_membership() {
        let mut selection = SelectionSet::default();
        let token = ExtensionToken::of_name("x.rs");

        selection.toggle(token.clone());
        assert!(selection.contains(&token));
        selection.toggle(token.clone());
        assert!(!selection.contains(&token));
    }

    #[test]
    fn allow_list_is_normalized() {
        for entry in DEFAULT_SELECTION_EXTENSIONS {
            assert!(entry.starts_with('.'), "entry {entry} must be dot-prefixed");
            assert_eq!(
                entry.to_ascii_lowercase().as_str(),
                *entry,
                "entry {entry} must be lower-case"
            );
        }
    }
}
