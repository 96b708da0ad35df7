//! Import a source folder by scanning, ignore-filtering, selecting
//! extensions, and delivering the resolved documents to the project store.

mod scanner;
mod types;

pub use types::{
    DeliverStageStats, FilterStageStats, ImportProgress, ImportSessionDeps, ImportSessionInput,
    ImportSessionOutput, ImportStageStats, ScanStageStats,
};

use code_intake_domain::{
    Candidate, ExtensionTally, ImportRootId, ImportSummary, SelectionSet, derive_import_root_id,
    resolve_import_set,
};
use code_intake_ports::{
    FileSystemPortExt, IgnorePort, IgnoreSource, LogFields, LoggerPort, ProjectDelivery,
    ProjectDocument,
};
use code_intake_shared::{ErrorCode, ErrorEnvelope, RequestContext, Result};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use types::ProgressTracker;

/// Run an import session using the provided dependencies and input.
pub async fn import_session(
    ctx: &RequestContext,
    deps: &ImportSessionDeps,
    input: ImportSessionInput,
) -> Result<ImportSessionOutput> {
    ctx.ensure_not_cancelled("import_session")?;

    let root_id = derive_import_root_id(&input.import_root).map_err(ErrorEnvelope::from)?;
    let logger = scope_logger(deps.logger.as_ref(), ctx, &root_id);
    let progress = ProgressTracker::new(input.on_progress.clone());

    progress.emit("Loading ignore rules...", 0, 100, 0);
    let sources = scanner::load_ignore_sources(ctx, deps, &input).await?;
    let matcher = compile_with_fallback(deps, &sources, logger.as_deref())?;

    progress.emit("Scanning files...", 0, 100, 10);
    let scan_started = Instant::now();
    let scan = scanner::scan_candidates(ctx, deps, &input, matcher.as_ref()).await?;
    let scan_stats = ScanStageStats {
        candidates: as_u64(scan.candidates.len()),
        truncated: scan.truncated,
        duration_ms: elapsed_ms(scan_started),
    };
    if let Some(logger) = logger.as_deref() {
        let mut fields = LogFields::new();
        fields.insert("candidates".into(), Value::from(scan.candidates.len()));
        fields.insert("truncated".into(), Value::from(scan.truncated));
        logger.info("import.scan.completed", "Candidate scan finished", Some(fields));
    }

    progress.emit(
        "Filtering candidates...",
        0,
        as_u64(scan.candidates.len()),
        40,
    );
    ctx.ensure_not_cancelled("import_session.filter")?;
    let filter_started = Instant::now();
    let allowed: Vec<Candidate> = scan
        .candidates
        .iter()
        .filter(|candidate| !matcher.is_ignored(candidate.relative_path()))
        .cloned()
        .collect();
    let ignored = scan.candidates.len() - allowed.len();
    let filter_stats = FilterStageStats {
        allowed: as_u64(allowed.len()),
        ignored: as_u64(ignored),
        duration_ms: elapsed_ms(filter_started),
    };

    let tally = ExtensionTally::from_candidates(&allowed);
    let selection = match input.selection_override.as_ref() {
        Some(tokens) => SelectionSet::from_tokens(tokens.iter().cloned()),
        None => SelectionSet::default_for(&tally),
    };
    let resolved = resolve_import_set(&allowed, &selection);

    let summary = ImportSummary {
        allowed_count: allowed.len(),
        ignored_count: ignored,
        to_import_count: resolved.len(),
    };
    if let Some(logger) = logger.as_deref() {
        let mut fields = LogFields::new();
        fields.insert("allowed".into(), Value::from(summary.allowed_count));
        fields.insert("ignored".into(), Value::from(summary.ignored_count));
        fields.insert("toImport".into(), Value::from(summary.to_import_count));
        logger.info("import.filter.completed", "Ignore filtering finished", Some(fields));
    }

    let deliver_stats = match deps.store.as_ref() {
        Some(store) => {
            deliver_documents(
                ctx,
                deps,
                &input,
                &progress,
                logger.as_deref(),
                store.as_ref(),
                &root_id,
                &resolved,
            )
            .await?
        },
        None => DeliverStageStats {
            documents: 0,
            skipped: 0,
            duration_ms: 0,
        },
    };

    progress.emit("Import complete", 100, 100, 100);
    Ok(ImportSessionOutput {
        root_id,
        summary,
        tally: tally.rows(),
        selection,
        imported_files: resolved
            .iter()
            .map(|candidate| candidate.relative_path().to_owned().into_boxed_str())
            .collect(),
        stage_stats: ImportStageStats {
            scan: scan_stats,
            filter: filter_stats,
            deliver: deliver_stats,
        },
    })
}

fn compile_with_fallback(
    deps: &ImportSessionDeps,
    sources: &[IgnoreSource],
    logger: Option<&dyn LoggerPort>,
) -> Result<Arc<dyn IgnorePort>> {
    match deps.ignore_compiler.compile(sources) {
        Ok(matcher) => Ok(matcher),
        Err(error) if error.code == ErrorCode::pattern_parse() => {
            if let Some(logger) = logger {
                let mut fields = LogFields::new();
                fields.insert("error".into(), Value::String(error.to_string()));
                logger.warn(
                    "import.ignore.pattern_parse_failed",
                    "Pattern source rejected; falling back to default rules only",
                    Some(fields),
                );
            }
            let defaults = [IgnoreSource::defaults()];
            deps.ignore_compiler.compile(&defaults)
        },
        Err(error) => Err(error),
    }
}

#[allow(clippy::too_many_arguments, reason = "internal stage helper mirrors the pipeline inputs")]
async fn deliver_documents(
    ctx: &RequestContext,
    deps: &ImportSessionDeps,
    input: &ImportSessionInput,
    progress: &ProgressTracker,
    logger: Option<&dyn LoggerPort>,
    store: &dyn code_intake_ports::ProjectStorePort,
    root_id: &ImportRootId,
    resolved: &[Candidate],
) -> Result<DeliverStageStats> {
    let deliver_started = Instant::now();
    let total = as_u64(resolved.len());
    let fs = deps.filesystem.session(input.import_root.clone());

    let mut documents = Vec::with_capacity(resolved.len());
    let mut skipped: u64 = 0;

    for (index, candidate) in resolved.iter().enumerate() {
        ctx.ensure_not_cancelled("import_session.deliver")?;
        progress.emit(
            "Reading documents...",
            as_u64(index + 1),
            total,
            deliver_percentage(index, resolved.len()),
        );

        let safe_path = deps
            .path_policy
            .to_safe_relative_path(candidate.relative_path())?;

        if let Some(limit) = input.max_file_size_bytes {
            match fs.stat(ctx, safe_path.clone()).await {
                Ok(stat) if stat.size_bytes > limit => {
                    skipped += 1;
                    warn_skipped(logger, candidate, "file exceeds max size");
                    continue;
                },
                Ok(_) => {},
                Err(error) => {
                    if error.is_cancelled() {
                        return Err(error);
                    }
                    skipped += 1;
                    warn_skipped(logger, candidate, "cannot stat file");
                    continue;
                },
            }
        }

        match fs.read_file_text(ctx, safe_path).await {
            Ok(content) => documents.push(ProjectDocument {
                relative_path: candidate.relative_path().to_owned().into_boxed_str(),
                content,
            }),
            Err(error) => {
                if error.is_cancelled() {
                    return Err(error);
                }
                skipped += 1;
                warn_skipped(logger, candidate, "cannot read file as UTF-8 text");
            },
        }
    }

    let document_count = as_u64(documents.len());
    store
        .deliver(
            ctx,
            ProjectDelivery {
                root_id: root_id.clone(),
                documents,
            },
        )
        .await?;

    if let Some(logger) = logger {
        let mut fields = LogFields::new();
        fields.insert("documents".into(), Value::from(document_count));
        fields.insert("skipped".into(), Value::from(skipped));
        logger.info("import.deliver.completed", "Delivery finished", Some(fields));
    }

    Ok(DeliverStageStats {
        documents: document_count,
        skipped,
        duration_ms: elapsed_ms(deliver_started),
    })
}

fn warn_skipped(logger: Option<&dyn LoggerPort>, candidate: &Candidate, reason: &str) {
    if let Some(logger) = logger {
        let mut fields = LogFields::new();
        fields.insert(
            "path".into(),
            Value::String(candidate.relative_path().to_owned()),
        );
        logger.warn("import.deliver.skipped", reason, Some(fields));
    }
}

fn scope_logger(
    logger: Option<&Arc<dyn LoggerPort>>,
    ctx: &RequestContext,
    root_id: &ImportRootId,
) -> Option<Box<dyn LoggerPort>> {
    let logger = logger?;
    let mut fields = LogFields::new();
    fields.insert(
        "correlationId".into(),
        Value::String(ctx.correlation_id().as_str().to_owned()),
    );
    fields.insert("rootId".into(), Value::String(root_id.as_str().to_owned()));
    Some(logger.child(fields))
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn as_u64(value: usize) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

fn deliver_percentage(index: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let span = 40 * (index + 1) / total;
    u8::try_from(60 + span).unwrap_or(100)
}
