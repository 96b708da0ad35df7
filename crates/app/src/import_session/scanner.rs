//! Candidate discovery and ignore-source assembly for `import_session`.

use super::types::{ImportSessionDeps, ImportSessionInput};
use code_intake_domain::Candidate;
use code_intake_ports::{FileSystemEntryKind, FileSystemPortExt, IgnorePort, IgnoreSource};
use code_intake_shared::{ErrorCode, RequestContext, Result};
use std::collections::VecDeque;

/// Label used for config-supplied extra rules.
const CONFIG_SOURCE_NAME: &str = "config";

/// Result of the candidate walk.
pub(crate) struct ScanOutcome {
    pub(crate) candidates: Vec<Candidate>,
    pub(crate) truncated: bool,
}

/// Assemble the ordered pattern sources: built-in defaults, config extras,
/// then the discovered repository ignore file (when present and readable).
///
/// The discovered ignore file itself is excluded from import via an extra
/// root-anchored rule, so hosts never feed their own rule file to analysis.
pub(crate) async fn load_ignore_sources(
    ctx: &RequestContext,
    deps: &ImportSessionDeps,
    input: &ImportSessionInput,
) -> Result<Vec<IgnoreSource>> {
    let mut sources = vec![IgnoreSource::defaults()];

    let mut config_rules: Vec<String> = input
        .extra_ignore_patterns
        .iter()
        .map(|pattern| pattern.to_string())
        .collect();
    config_rules.push(format!("/{}", input.ignore_file_name));
    sources.push(IgnoreSource::new(
        CONFIG_SOURCE_NAME,
        config_rules.join("\n"),
    ));

    let safe_path = deps
        .path_policy
        .to_safe_relative_path(input.ignore_file_name.as_ref())?;
    let fs = deps.filesystem.session(input.import_root.clone());
    match fs.read_file_text(ctx, safe_path).await {
        Ok(contents) => {
            sources.push(IgnoreSource::new(input.ignore_file_name.clone(), contents));
        },
        Err(error) => {
            if error.is_cancelled() {
                return Err(error);
            }
            if error.code != ErrorCode::not_found()
                && let Some(logger) = deps.logger.as_ref()
            {
                logger.warn(
                    "import.ignore.read_failed",
                    "Failed to read the repository ignore file; continuing without it",
                    None,
                );
            }
        },
    }

    Ok(sources)
}

/// Walk the import root breadth-first, producing candidates in discovery
/// order. Ignored directories are pruned only when the matcher carries no
/// negations, so later `!` rules can still re-include content.
pub(crate) async fn scan_candidates(
    ctx: &RequestContext,
    deps: &ImportSessionDeps,
    input: &ImportSessionInput,
    matcher: &dyn IgnorePort,
) -> Result<ScanOutcome> {
    if let Some(file_list) = input.candidate_list.as_ref() {
        let mut candidates = Vec::with_capacity(file_list.len());
        for raw in file_list {
            let candidate = Candidate::parse(raw.as_ref())?;
            candidates.push(candidate);
            if input
                .max_files
                .is_some_and(|max| candidates.len() >= max.get())
            {
                return Ok(ScanOutcome {
                    candidates,
                    truncated: true,
                });
            }
        }
        return Ok(ScanOutcome {
            candidates,
            truncated: false,
        });
    }

    let prune_ignored_dirs = !matcher.has_negations();
    let fs = deps.filesystem.session(input.import_root.clone());

    let mut dirs: VecDeque<String> = VecDeque::from([String::from(".")]);
    let mut candidates: Vec<Candidate> = Vec::new();

    while let Some(dir) = dirs.pop_front() {
        ctx.ensure_not_cancelled("import_session.scan")?;

        let safe_dir = deps.path_policy.to_safe_relative_path(&dir)?;
        let entries = match fs.read_dir(ctx, safe_dir).await {
            Ok(entries) => entries,
            Err(error) => {
                if error.is_cancelled() {
                    return Err(error);
                }
                if let Some(logger) = deps.logger.as_ref() {
                    logger.warn(
                        "import.scan.dir_read_failed",
                        "Cannot read directory during scan",
                        None,
                    );
                }
                continue;
            },
        };

        let mut sorted = entries;
        sorted.sort_by(|a, b| a.name.cmp(&b.name));

        for entry in sorted {
            ctx.ensure_not_cancelled("import_session.scan_entry")?;

            let rel = join_relative(&dir, entry.name.as_ref());
            match entry.kind {
                FileSystemEntryKind::Directory => {
                    if prune_ignored_dirs && matcher.is_ignored(&format!("{rel}/")) {
                        continue;
                    }
                    dirs.push_back(rel);
                },
                FileSystemEntryKind::File => {
                    candidates.push(Candidate::parse(&rel)?);
                    if input
                        .max_files
                        .is_some_and(|max| candidates.len() >= max.get())
                    {
                        return Ok(ScanOutcome {
                            candidates,
                            truncated: true,
                        });
                    }
                },
                FileSystemEntryKind::Other => {},
            }
        }
    }

    Ok(ScanOutcome {
        candidates,
        truncated: false,
    })
}

fn join_relative(parent: &str, child: &str) -> String {
    if parent == "." || parent.trim().is_empty() {
        child.to_string()
    } else {
        format!("{parent}/{child}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_relative_handles_root_dir() {
        assert_eq!(join_relative(".", "src"), "src");
        assert_eq!(join_relative("src", "lib.rs"), "src/lib.rs");
    }
}
