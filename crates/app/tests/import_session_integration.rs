//! End-to-end import session tests against the real adapters.

use code_intake_adapters::fs::{LocalFileSystem, LocalPathPolicy};
use code_intake_adapters::gitignore::GitignoreCompiler;
use code_intake_adapters::store::MemoryProjectStore;
use code_intake_app::{ImportSessionDeps, ImportSessionInput, import_session};
use code_intake_domain::ExtensionToken;
use code_intake_ports::ProjectStorePort;
use code_intake_shared::{ErrorEnvelope, RequestContext, Result};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

fn fixture_root(name: &str) -> Result<PathBuf> {
    let root = std::env::temp_dir().join(format!("cintake_app_{name}"));
    let _ = fs::remove_dir_all(&root);
    for dir in ["src", "node_modules/pkg", "docs"] {
        fs::create_dir_all(root.join(dir)).map_err(ErrorEnvelope::from)?;
    }
    let files = [
        ("README.md", "# fixture\n"),
        ("src/lib.rs", "pub fn lib() {}\n"),
        ("src/main.rs", "fn main() {}\n"),
        ("src/helper.py", "def helper():\n    pass\n"),
        ("src/blob.bin", "0000\n"),
        ("docs/notes.txt", "notes\n"),
        ("node_modules/pkg/index.js", "module.exports = {};\n"),
        ("debug.log", "line\n"),
        ("keep.log", "line\n"),
        (".gitignore", "*.log\n!keep.log\n"),
    ];
    for (path, content) in files {
        fs::write(root.join(path), content).map_err(ErrorEnvelope::from)?;
    }
    Ok(root)
}

fn deps_with_store(store: Option<Arc<MemoryProjectStore>>) -> ImportSessionDeps {
    let store: Option<Arc<dyn ProjectStorePort>> = match store {
        Some(memory) => Some(memory),
        None => None,
    };
    ImportSessionDeps {
        filesystem: Arc::new(LocalFileSystem::default()),
        path_policy: Arc::new(LocalPathPolicy::new()),
        ignore_compiler: Arc::new(GitignoreCompiler::new()),
        store,
        logger: None,
    }
}

fn input_for(root: PathBuf) -> ImportSessionInput {
    ImportSessionInput {
        import_root: root,
        candidate_list: None,
        ignore_file_name: ".gitignore".into(),
        extra_ignore_patterns: Vec::new(),
        selection_override: None,
        max_files: None,
        max_file_size_bytes: None,
        on_progress: None,
    }
}

#[tokio::test]
async fn full_pipeline_filters_selects_and_delivers() -> Result<()> {
    let root = fixture_root("full")?;
    let store = Arc::new(MemoryProjectStore::new());
    let deps = deps_with_store(Some(store.clone()));
    let ctx = RequestContext::new_request();

    let output = import_session(&ctx, &deps, input_for(root)).await?;

    // Ignored: node_modules and blob.bin by the defaults, debug.log by the
    // discovered rules, the ignore file by the config source; keep.log is
    // re-included by the later `!` rule.
    assert_eq!(output.summary.ignored_count, 4);
    assert_eq!(output.summary.allowed_count, 6);
    let imported: Vec<&str> = output
        .imported_files
        .iter()
        .map(AsRef::as_ref)
        .collect();
    assert_eq!(imported, vec!["README.md", "src/helper.py", "src/lib.rs", "src/main.rs"]);

    // keep.log and notes.txt survive filtering but are not in the default
    // selection.
    assert_eq!(output.summary.to_import_count, 4);

    let tally_tokens: Vec<&str> = output
        .tally
        .iter()
        .map(|row| row.token.as_str())
        .collect();
    assert_eq!(tally_tokens, vec![".rs", ".log", ".md", ".py", ".txt"]);

    let deliveries = store.take();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].root_id, output.root_id);
    let delivered: Vec<&str> = deliveries[0]
        .documents
        .iter()
        .map(|doc| doc.relative_path.as_ref())
        .collect();
    assert_eq!(delivered, vec!["README.md", "src/helper.py", "src/lib.rs", "src/main.rs"]);

    assert_eq!(output.stage_stats.deliver.documents, 4);
    assert_eq!(output.stage_stats.deliver.skipped, 0);
    Ok(())
}

#[tokio::test]
async fn scan_only_sessions_skip_delivery() -> Result<()> {
    let root = fixture_root("scan_only")?;
    let deps = deps_with_store(None);
    let ctx = RequestContext::new_request();

    let output = import_session(&ctx, &deps, input_for(root)).await?;

    assert_eq!(output.summary.to_import_count, 4);
    assert_eq!(output.stage_stats.deliver.documents, 0);
    assert_eq!(output.stage_stats.deliver.duration_ms, 0);
    Ok(())
}

#[tokio::test]
async fn selection_override_replaces_default_selection() -> Result<()> {
    let root = fixture_root("override")?;
    let store = Arc::new(MemoryProjectStore::new());
    let deps = deps_with_store(Some(store.clone()));
    let ctx = RequestContext::new_request();

    let mut input = input_for(root);
    input.selection_override = Some(vec![
        ExtensionToken::parse(".txt").expect("valid token"),
    ]);
    let output = import_session(&ctx, &deps, input).await?;

    let imported: Vec<&str> = output.imported_files.iter().map(AsRef::as_ref).collect();
    assert_eq!(imported, vec!["docs/notes.txt"]);
    assert_eq!(output.summary.to_import_count, 1);
    Ok(())
}

#[tokio::test]
async fn oversize_files_are_skipped_at_delivery() -> Result<()> {
    let root = fixture_root("oversize")?;
    let store = Arc::new(MemoryProjectStore::new());
    let deps = deps_with_store(Some(store.clone()));
    let ctx = RequestContext::new_request();

    let mut input = input_for(root);
    input.max_file_size_bytes = Some(10);
    let output = import_session(&ctx, &deps, input).await?;

    // Only README.md fits under the limit; the source files exceed it.
    assert!(output.stage_stats.deliver.skipped > 0);
    assert_eq!(
        output.stage_stats.deliver.documents + output.stage_stats.deliver.skipped,
        4
    );
    Ok(())
}

#[tokio::test]
async fn explicit_candidate_lists_skip_the_walk() -> Result<()> {
    let root = fixture_root("explicit")?;
    let deps = deps_with_store(None);
    let ctx = RequestContext::new_request();

    let mut input = input_for(root);
    input.candidate_list = Some(vec![
        "src/lib.rs".into(),
        "debug.log".into(),
        "node_modules/pkg/index.js".into(),
    ]);
    let output = import_session(&ctx, &deps, input).await?;

    assert_eq!(output.stage_stats.scan.candidates, 3);
    assert_eq!(output.summary.allowed_count, 1);
    assert_eq!(output.summary.ignored_count, 2);
    let imported: Vec<&str> = output.imported_files.iter().map(AsRef::as_ref).collect();
    assert_eq!(imported, vec!["src/lib.rs"]);
    Ok(())
}

#[tokio::test]
async fn max_files_truncates_the_scan() -> Result<()> {
    let root = fixture_root("truncated")?;
    let deps = deps_with_store(None);
    let ctx = RequestContext::new_request();

    let mut input = input_for(root);
    input.max_files = std::num::NonZeroUsize::new(2);
    let output = import_session(&ctx, &deps, input).await?;

    assert_eq!(output.stage_stats.scan.candidates, 2);
    assert!(output.stage_stats.scan.truncated);
    Ok(())
}

#[tokio::test]
async fn cancelled_context_aborts_the_session() -> Result<()> {
    let root = fixture_root("cancelled")?;
    let deps = deps_with_store(None);
    let ctx = RequestContext::new_request();
    ctx.cancel();

    let error = import_session(&ctx, &deps, input_for(root))
        .await
        .expect_err("cancelled context must abort");
    assert!(error.is_cancelled());
    Ok(())
}

#[tokio::test]
async fn progress_reaches_completion() -> Result<()> {
    let root = fixture_root("progress")?;
    let deps = deps_with_store(None);
    let ctx = RequestContext::new_request();

    let seen: Arc<std::sync::Mutex<Vec<u8>>> = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let mut input = input_for(root);
    input.on_progress = Some(Arc::new(move |update| {
        if let Ok(mut guard) = sink.lock() {
            guard.push(update.percentage);
        }
    }));

    let _output = import_session(&ctx, &deps, input).await?;
    let percentages = seen.lock().expect("progress sink lock");
    assert_eq!(percentages.first(), Some(&0));
    assert_eq!(percentages.last(), Some(&100));
    Ok(())
}
