//! Shared types for the `import_session` pipeline.

use code_intake_domain::{ExtensionToken, ImportRootId, ImportSummary, SelectionSet, TallyRow};
use code_intake_ports::{
    FileSystemPort, IgnoreCompilerPort, LoggerPort, PathPolicyPort, ProjectStorePort,
};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;

/// Progress update emitted by the import use-case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportProgress {
    /// Current phase description.
    pub phase: Box<str>,
    /// Current item count.
    pub current: u64,
    /// Total item count.
    pub total: u64,
    /// Completion percentage (0-100).
    pub percentage: u8,
}

impl ImportProgress {
    pub(crate) fn new(phase: impl AsRef<str>, current: u64, total: u64, percentage: u8) -> Self {
        Self {
            phase: phase.as_ref().to_owned().into_boxed_str(),
            current,
            total,
            percentage: percentage.min(100),
        }
    }
}

/// Scan stage stats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanStageStats {
    /// Candidates discovered by the walk (or accepted from the caller).
    pub candidates: u64,
    /// True when `max_files` stopped the walk early.
    pub truncated: bool,
    /// Elapsed time in milliseconds.
    pub duration_ms: u64,
}

/// Filter stage stats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterStageStats {
    /// Candidates surviving ignore filtering.
    pub allowed: u64,
    /// Candidates excluded by ignore rules.
    pub ignored: u64,
    /// Elapsed time in milliseconds.
    pub duration_ms: u64,
}

/// Delivery stage stats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliverStageStats {
    /// Documents handed to the project store.
    pub documents: u64,
    /// Resolved files skipped (oversize or unreadable).
    pub skipped: u64,
    /// Elapsed time in milliseconds.
    pub duration_ms: u64,
}

/// Aggregated import stage stats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStageStats {
    /// Scan stage stats.
    pub scan: ScanStageStats,
    /// Filter stage stats.
    pub filter: FilterStageStats,
    /// Delivery stage stats.
    pub deliver: DeliverStageStats,
}

/// Output returned by the import use-case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSessionOutput {
    /// Stable id derived from the import root.
    pub root_id: ImportRootId,
    /// Summary counters for the host's import dialog.
    pub summary: ImportSummary,
    /// Extension tally rows in display order.
    pub tally: Vec<TallyRow>,
    /// Effective extension selection.
    pub selection: SelectionSet,
    /// Resolved relative paths in original order.
    pub imported_files: Vec<Box<str>>,
    /// Stage-level stats.
    pub stage_stats: ImportStageStats,
}

/// Input configuration for an import session.
#[derive(Clone)]
pub struct ImportSessionInput {
    /// Import root directory (absolute path).
    pub import_root: PathBuf,
    /// Optional explicit candidate list (relative paths); skips the walk.
    pub candidate_list: Option<Vec<Box<str>>>,
    /// Name of the discovered repository ignore file.
    pub ignore_file_name: Box<str>,
    /// Extra ignore rules applied between defaults and the discovered file.
    pub extra_ignore_patterns: Vec<Box<str>>,
    /// Optional explicit selection replacing the default one.
    pub selection_override: Option<Vec<ExtensionToken>>,
    /// Maximum number of candidates the scan may produce.
    pub max_files: Option<NonZeroUsize>,
    /// Resolved files larger than this are skipped at delivery time.
    pub max_file_size_bytes: Option<u64>,
    /// Optional progress callback.
    pub on_progress: Option<Arc<dyn Fn(ImportProgress) + Send + Sync>>,
}

/// Dependencies required by the import use-case.
#[derive(Clone)]
pub struct ImportSessionDeps {
    /// Filesystem adapter.
    pub filesystem: Arc<dyn FileSystemPort>,
    /// Path policy adapter.
    pub path_policy: Arc<dyn PathPolicyPort>,
    /// Ignore pattern compiler.
    pub ignore_compiler: Arc<dyn IgnoreCompilerPort>,
    /// Downstream project store; `None` runs a scan-only session.
    pub store: Option<Arc<dyn ProjectStorePort>>,
    /// Optional logger.
    pub logger: Option<Arc<dyn LoggerPort>>,
}

pub(crate) struct ProgressTracker {
    callback: Option<Arc<dyn Fn(ImportProgress) + Send + Sync>>,
}

impl ProgressTracker {
    pub(crate) fn new(callback: Option<Arc<dyn Fn(ImportProgress) + Send + Sync>>) -> Self {
        Self { callback }
    }

    pub(crate) fn emit(&self, phase: &str, current: u64, total: u64, percentage: u8) {
        if let Some(callback) = self.callback.as_ref() {
            callback(ImportProgress::new(phase, current, total, percentage));
        }
    }
}
