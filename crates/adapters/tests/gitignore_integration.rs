//! Filesystem + gitignore matcher integration tests.

use code_intake_adapters::fs::{LocalFileSystem, LocalPathPolicy};
use code_intake_adapters::gitignore::GitignoreMatcher;
use code_intake_domain::DEFAULT_SOURCE_NAME;
use code_intake_ports::{
    FileSystemEntryKind, FileSystemPort, IgnoreSource, PathPolicyPort, SafeRelativePath,
};
use code_intake_shared::{ErrorEnvelope, RequestContext, Result};
use std::fs;
use std::path::PathBuf;

fn fixture_root(name: &str) -> Result<PathBuf> {
    let root = std::env::temp_dir().join(format!("cintake_it_{name}"));
    let _ = fs::remove_dir_all(&root);
    for dir in ["src", "node_modules/pkg", "logs"] {
        fs::create_dir_all(root.join(dir)).map_err(ErrorEnvelope::from)?;
    }
    let files = [
        ("README.md", "# fixture\n"),
        ("src/lib.rs", "pub fn lib() {}\n"),
        ("src/main.rs", "fn main() {}\n"),
        ("src/app.min.js", "var a=1;\n"),
        ("node_modules/pkg/index.js", "module.exports = {};\n"),
        ("logs/debug.log", "line\n"),
        ("logs/keep.log", "line\n"),
        (".gitignore", "*.log\n!keep.log\n"),
    ];
    for (path, content) in files {
        fs::write(root.join(path), content).map_err(ErrorEnvelope::from)?;
    }
    Ok(root)
}

async fn walk_files(root: &PathBuf, matcher: &GitignoreMatcher) -> Result<Vec<String>> {
    let ctx = RequestContext::new_request();
    let fs_port = LocalFileSystem::default();
    let policy = LocalPathPolicy::new();

    let mut pending = vec![SafeRelativePath::new(".")?];
    let mut files = Vec::new();
    while let Some(dir) = pending.pop() {
        let entries = fs_port.read_dir(&ctx, root.clone(), dir.clone()).await?;
        for entry in entries {
            let rel = if dir.as_str() == "." {
                entry.name.to_string()
            } else {
                format!("{}/{}", dir.as_str(), entry.name)
            };
            match entry.kind {
                FileSystemEntryKind::Directory => {
                    if !matcher.has_negations() && matcher.is_ignored(&format!("{rel}/")) {
                        continue;
                    }
                    let safe = policy.to_safe_relative_path(&rel)?;
                    pending.push(safe);
                },
                FileSystemEntryKind::File => {
                    if !matcher.is_ignored(&rel) {
                        files.push(rel);
                    }
                },
                FileSystemEntryKind::Other => {},
            }
        }
    }

    files.sort();
    Ok(files)
}

#[tokio::test]
async fn defaults_prune_infrastructure_paths() -> Result<()> {
    let root = fixture_root("defaults")?;
    let matcher = GitignoreMatcher::build(&[IgnoreSource::defaults()])?;

    let files = walk_files(&root, &matcher).await?;
    assert_eq!(
        files,
        vec![
            ".gitignore",
            "README.md",
            "logs/debug.log",
            "logs/keep.log",
            "src/lib.rs",
            "src/main.rs",
        ]
    );
    Ok(())
}

#[tokio::test]
async fn discovered_rules_layer_over_defaults() -> Result<()> {
    let root = fixture_root("layered")?;
    let ctx = RequestContext::new_request();
    let fs_port = LocalFileSystem::default();
    let discovered = fs_port
        .read_file_text(&ctx, root.clone(), SafeRelativePath::new(".gitignore")?)
        .await?;

    let matcher = GitignoreMatcher::build(&[
        IgnoreSource::defaults(),
        IgnoreSource::new(".gitignore", discovered),
    ])?;

    let files = walk_files(&root, &matcher).await?;
    assert_eq!(
        files,
        vec![
            ".gitignore",
            "README.md",
            "logs/keep.log",
            "src/lib.rs",
            "src/main.rs",
        ]
    );
    Ok(())
}

#[tokio::test]
async fn matcher_decisions_match_walk_results() -> Result<()> {
    let root = fixture_root("consistency")?;
    let matcher = GitignoreMatcher::build(&[IgnoreSource::defaults()])?;

    let files = walk_files(&root, &matcher).await?;
    for file in &files {
        assert!(
            !matcher.is_ignored(file),
            "walked file {file} must not be ignored"
        );
    }
    assert!(matcher.is_ignored("node_modules/pkg/index.js"));
    assert!(matcher.is_ignored("src/app.min.js"));

    assert_eq!(IgnoreSource::defaults().name.as_ref(), DEFAULT_SOURCE_NAME);
    Ok(())
}
