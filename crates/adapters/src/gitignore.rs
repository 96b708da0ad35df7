//! Gitignore-style pattern engine and matcher adapter.
//!
//! The matcher is compiled once from ordered pattern sources and then
//! evaluated as a pure function: last matching rule wins, `!` re-includes,
//! no match means not ignored. Malformed lines are skipped; only a source
//! that is not valid text (NUL or control bytes) rejects the whole source.

use code_intake_domain::Candidate;
use code_intake_ports::{IgnoreCompilerPort, IgnorePort, IgnoreSource};
use code_intake_shared::{ErrorCode, ErrorEnvelope, Result};
use std::sync::Arc;

/// One token of a single-segment glob.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SegToken {
    /// Literal character (escapes already resolved).
    Literal(char),
    /// `?` - any single character except `/`.
    AnyChar,
    /// `*` - any run of characters except `/`.
    AnyRun,
    /// `[...]` / `[!...]` character class.
    Class {
        negated: bool,
        ranges: Vec<(char, char)>,
    },
}

/// One `/`-separated segment of a compiled glob.
#[derive(Debug, Clone, PartialEq, Eq)]
enum GlobSegment {
    /// `**` as a full segment: zero or more path segments.
    AnyDirs,
    /// A concrete segment pattern.
    Pattern(Vec<SegToken>),
}

/// A single parsed ignore rule.
#[derive(Debug, Clone, PartialEq, Eq)]
struct IgnoreRule {
    segments: Vec<GlobSegment>,
    anchored_to_root: bool,
    directory_only: bool,
    negated: bool,
    source_order: usize,
}

/// Outcome of the deciding rule for a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IgnoreDecision {
    /// Final decision: true when the path is ignored.
    pub ignored: bool,
    /// Position of the deciding rule across all sources.
    pub source_order: usize,
    /// True when the deciding rule was a `!` re-include.
    pub negated: bool,
}

/// Compiled gitignore-style matcher.
///
/// Holds no mutable state; safe to share across threads and to call in any
/// order. Paths are evaluated relative to the import root with `/`
/// separators; a trailing `/` marks the path as a directory.
#[derive(Debug, Clone, Default)]
pub struct GitignoreMatcher {
    rules: Vec<IgnoreRule>,
    has_negations: bool,
}

impl GitignoreMatcher {
    /// Compile ordered pattern sources into a matcher.
    ///
    /// Later sources override earlier ones via rule order. Fails only when a
    /// source is not valid pattern text (embedded NUL or control bytes);
    /// individual malformed lines are skipped, never fatal.
    pub fn build(sources: &[IgnoreSource]) -> Result<Self> {
        let mut rules = Vec::new();
        for source in sources {
            validate_source_text(source)?;
            for line in source.text.lines() {
                let source_order = rules.len();
                if let Some(rule) = parse_rule(line, source_order) {
                    rules.push(rule);
                }
            }
        }

        let has_negations = rules.iter().any(|rule| rule.negated);
        Ok(Self {
            rules,
            has_negations,
        })
    }

    /// Number of compiled rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Returns true when any compiled rule is a negation.
    ///
    /// Callers walking a tree must not prune ignored directories in that
    /// case: a later `!` rule may re-include content beneath them.
    #[must_use]
    pub fn has_negations(&self) -> bool {
        self.has_negations
    }

    /// Decide whether a root-relative path is ignored.
    ///
    /// A trailing `/` marks the path as a directory, which is what allows
    /// directory-only rules (`build/`) to match the directory itself rather
    /// than only ancestors of a file path.
    #[must_use]
    pub fn is_ignored(&self, relative_path: &str) -> bool {
        self.decide(relative_path)
            .is_some_and(|decision| decision.ignored)
    }

    /// Report the deciding rule for a path, `None` when no rule matched.
    ///
    /// Evaluation is last-match-wins in source order, so the returned rule
    /// position explains exactly why a path was excluded or re-included.
    #[must_use]
    pub fn decide(&self, relative_path: &str) -> Option<IgnoreDecision> {
        let (path, is_dir) = split_dir_marker(relative_path);
        let segments: Vec<&str> = path
            .split('/')
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .collect();
        if segments.is_empty() {
            return None;
        }

        let mut decision = None;
        for rule in &self.rules {
            if rule_matches(rule, &segments, is_dir) {
                decision = Some(IgnoreDecision {
                    ignored: !rule.negated,
                    source_order: rule.source_order,
                    negated: rule.negated,
                });
            }
        }
        decision
    }

    /// Order-preserving subsequence of candidates that are not ignored.
    ///
    /// `allowed.len() + ignored count == candidates.len()` always holds.
    #[must_use]
    pub fn filter_allowed(&self, candidates: &[Candidate]) -> Vec<Candidate> {
        candidates
            .iter()
            .filter(|candidate| !self.is_ignored(candidate.relative_path()))
            .cloned()
            .collect()
    }
}

impl IgnorePort for GitignoreMatcher {
    fn is_ignored(&self, relative_path: &str) -> bool {
        Self::is_ignored(self, relative_path)
    }

    fn has_negations(&self) -> bool {
        Self::has_negations(self)
    }
}

/// Compiler adapter producing [`GitignoreMatcher`] values behind the port.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitignoreCompiler;

impl GitignoreCompiler {
    /// Build a default compiler.
    pub const fn new() -> Self {
        Self
    }
}

impl IgnoreCompilerPort for GitignoreCompiler {
    fn compile(&self, sources: &[IgnoreSource]) -> Result<Arc<dyn IgnorePort>> {
        let matcher = GitignoreMatcher::build(sources)?;
        Ok(Arc::new(matcher))
    }
}

fn validate_source_text(source: &IgnoreSource) -> Result<()> {
    let ok = source
        .text
        .chars()
        .all(|ch| ch == '\n' || ch == '\r' || ch == '\t' || !ch.is_control());
    if ok {
        Ok(())
    } else {
        Err(ErrorEnvelope::expected(
            ErrorCode::pattern_parse(),
            "pattern source contains control bytes",
        )
        .with_metadata("source", source.name.to_string()))
    }
}

// Trailing slash marks a directory path.
fn split_dir_marker(path: &str) -> (&str, bool) {
    match path.strip_suffix('/') {
        Some(trimmed) => (trimmed, true),
        None => (path, false),
    }
}

/// Parse one raw line into a rule. Returns `None` for blank lines,
/// comments, and malformed patterns (unterminated class, trailing lone
/// backslash, bare separators).
fn parse_rule(line: &str, source_order: usize) -> Option<IgnoreRule> {
    let line = trim_unescaped_trailing_spaces(line);
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (negated, body) = match line.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, line),
    };

    let (directory_only, body) = match body.strip_suffix('/') {
        Some(rest) => (true, rest),
        None => (false, body),
    };

    let (leading_slash, body) = match body.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, body),
    };
    if body.is_empty() {
        return None;
    }

    // A separator anywhere anchors the pattern to the root; a bare name
    // matches the basename at any depth.
    let anchored_to_root = leading_slash || body.contains('/');

    let segments = compile_glob(body)?;
    Some(IgnoreRule {
        segments,
        anchored_to_root,
        directory_only,
        negated,
        source_order,
    })
}

/// Trailing unescaped spaces are insignificant; `\ ` keeps a literal space.
fn trim_unescaped_trailing_spaces(line: &str) -> &str {
    let mut end = line.len();
    let bytes = line.as_bytes();
    while end > 0 && bytes.get(end - 1) == Some(&b' ') {
        let escaped = end >= 2 && bytes.get(end - 2) == Some(&b'\\');
        if escaped {
            break;
        }
        end -= 1;
    }
    line.get(..end).unwrap_or(line)
}

fn compile_glob(body: &str) -> Option<Vec<GlobSegment>> {
    let mut segments = Vec::new();
    for raw_segment in body.split('/') {
        if raw_segment == "**" {
            // Collapse runs of `**` segments.
            if segments.last() != Some(&GlobSegment::AnyDirs) {
                segments.push(GlobSegment::AnyDirs);
            }
            continue;
        }
        segments.push(GlobSegment::Pattern(compile_segment(raw_segment)?));
    }

    // A trailing `**` matches the contents of a directory, not the
    // directory itself: require at least one more segment.
    if segments.last() == Some(&GlobSegment::AnyDirs) {
        segments.push(GlobSegment::Pattern(vec![SegToken::AnyRun]));
    }

    if segments.is_empty() {
        return None;
    }
    Some(segments)
}

fn compile_segment(raw: &str) -> Option<Vec<SegToken>> {
    let mut tokens = Vec::new();
    let mut chars = raw.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                // Escape: next character is literal. A trailing lone
                // backslash invalidates the line.
                let literal = chars.next()?;
                tokens.push(SegToken::Literal(literal));
            },
            '?' => tokens.push(SegToken::AnyChar),
            '*' => {
                // Consecutive asterisks inside a segment collapse to one.
                while chars.peek() == Some(&'*') {
                    chars.next();
                }
                tokens.push(SegToken::AnyRun);
            },
            '[' => tokens.push(compile_class(&mut chars)?),
            other => tokens.push(SegToken::Literal(other)),
        }
    }

    Some(tokens)
}

fn compile_class(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<SegToken> {
    let mut negated = false;
    if matches!(chars.peek(), Some('!' | '^')) {
        chars.next();
        negated = true;
    }

    let mut ranges = Vec::new();
    let mut first = true;
    loop {
        let ch = chars.next()?;
        if ch == ']' && !first {
            break;
        }
        first = false;

        let low = if ch == '\\' { chars.next()? } else { ch };
        if chars.peek() == Some(&'-') {
            chars.next();
            match chars.peek() {
                // `[a-]` keeps `-` literal.
                Some(']') => {
                    ranges.push((low, low));
                    ranges.push(('-', '-'));
                },
                _ => {
                    let mut high = chars.next()?;
                    if high == '\\' {
                        high = chars.next()?;
                    }
                    ranges.push((low, high));
                },
            }
        } else {
            ranges.push((low, low));
        }
    }

    if ranges.is_empty() {
        return None;
    }
    Some(SegToken::Class { negated, ranges })
}

fn rule_matches(rule: &IgnoreRule, path_segments: &[&str], path_is_dir: bool) -> bool {
    let total = path_segments.len();
    for prefix_len in 1..=total {
        let target_is_full_path = prefix_len == total;
        if rule.directory_only && target_is_full_path && !path_is_dir {
            continue;
        }

        let Some(prefix) = path_segments.get(..prefix_len) else {
            continue;
        };
        let matched = if rule.anchored_to_root {
            segments_match(&rule.segments, prefix)
        } else {
            match (rule.segments.as_slice(), prefix.last()) {
                ([GlobSegment::Pattern(tokens)], Some(basename)) => {
                    segment_matches(tokens, basename)
                },
                _ => false,
            }
        };
        if matched {
            return true;
        }
    }
    false
}

fn segments_match(glob: &[GlobSegment], path: &[&str]) -> bool {
    match glob.split_first() {
        None => path.is_empty(),
        Some((GlobSegment::AnyDirs, rest)) => {
            (0..=path.len()).any(|skip| match path.get(skip..) {
                Some(remaining) => segments_match(rest, remaining),
                None => false,
            })
        },
        Some((GlobSegment::Pattern(tokens), rest)) => match path.split_first() {
            Some((segment, remaining)) => {
                segment_matches(tokens, segment) && segments_match(rest, remaining)
            },
            None => false,
        },
    }
}

fn segment_matches(tokens: &[SegToken], segment: &str) -> bool {
    let chars: Vec<char> = segment.chars().collect();
    tokens_match(tokens, &chars)
}

fn tokens_match(tokens: &[SegToken], text: &[char]) -> bool {
    let Some((token, rest)) = tokens.split_first() else {
        return text.is_empty();
    };

    match token {
        SegToken::Literal(expected) => match text.split_first() {
            Some((ch, remaining)) => ch == expected && tokens_match(rest, remaining),
            None => false,
        },
        SegToken::AnyChar => match text.split_first() {
            Some((_, remaining)) => tokens_match(rest, remaining),
            None => false,
        },
        SegToken::Class { negated, ranges } => match text.split_first() {
            Some((ch, remaining)) => {
                let inside = ranges.iter().any(|(low, high)| (*low..=*high).contains(ch));
                inside != *negated && tokens_match(rest, remaining)
            },
            None => false,
        },
        SegToken::AnyRun => (0..=text.len()).any(|consumed| match text.get(consumed..) {
            Some(remaining) => tokens_match(rest, remaining),
            None => false,
        }),
    }
}
