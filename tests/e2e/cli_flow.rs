//! CLI E2E flow tests: scan and import against a fixture tree.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::Command;

fn fixture_root(name: &str) -> io::Result<PathBuf> {
    let root = std::env::temp_dir().join(format!("cintake_e2e_{name}"));
    let _ = fs::remove_dir_all(&root);
    fs::create_dir_all(root.join("src"))?;
    fs::create_dir_all(root.join("node_modules/pkg"))?;
    fs::write(root.join("README.md"), "# fixture\n")?;
    fs::write(root.join("src/lib.rs"), "pub fn lib() {}\n")?;
    fs::write(root.join("src/app.min.js"), "var a=1;\n")?;
    fs::write(root.join("node_modules/pkg/index.js"), "module.exports = {};\n")?;
    fs::write(root.join("debug.log"), "line\n")?;
    fs::write(root.join(".gitignore"), "*.log\n")?;
    Ok(root)
}

fn run_cli(args: &[&str]) -> io::Result<serde_json::Value> {
    let output = Command::new(env!("CARGO_BIN_EXE_cintake")).args(args).output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(io::Error::other(format!("command failed: {stderr}")));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(stdout.trim()).map_err(io::Error::other)
}

#[test]
fn scan_reports_summary_and_tally() -> io::Result<()> {
    let root = fixture_root("scan")?;
    let root_arg = root.display().to_string();

    let payload = run_cli(&[
        "scan",
        "--root",
        &root_arg,
        "--output",
        "json",
        "--no-progress",
    ])?;

    assert_eq!(payload.get("status").and_then(|v| v.as_str()), Some("ok"));
    let summary = payload.get("summary").ok_or_else(|| io::Error::other("missing summary"))?;
    // Allowed: README.md + src/lib.rs; ignored: min.js, node_modules,
    // debug.log, and the .gitignore itself.
    assert_eq!(summary.get("allowed").and_then(|v| v.as_u64()), Some(2));
    assert_eq!(summary.get("toImport").and_then(|v| v.as_u64()), Some(2));

    let selection: Vec<&str> = payload
        .get("selection")
        .and_then(|v| v.as_array())
        .map(|items| items.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();
    assert_eq!(selection, vec![".md", ".rs"]);
    Ok(())
}

#[test]
fn scan_is_deterministic() -> io::Result<()> {
    let root = fixture_root("deterministic")?;
    let root_arg = root.display().to_string();
    let args = ["scan", "--root", root_arg.as_str(), "--agent"];

    let mut first = run_cli(&args)?;
    let mut second = run_cli(&args)?;
    // Stage durations are wall-clock; everything else must be stable.
    for payload in [&mut first, &mut second] {
        if let Some(object) = payload.as_object_mut() {
            object.remove("stageStats");
        }
    }
    assert_eq!(first, second, "scan output should be deterministic");
    Ok(())
}

#[test]
fn import_writes_jsonl_delivery() -> io::Result<()> {
    let root = fixture_root("import")?;
    let root_arg = root.display().to_string();
    let out_path = std::env::temp_dir().join("cintake_e2e_import_out.jsonl");
    let _ = fs::remove_file(&out_path);
    let out_arg = out_path.display().to_string();

    let payload = run_cli(&[
        "import",
        "--root",
        &root_arg,
        "--out",
        &out_arg,
        "--select",
        "rs",
        "--output",
        "json",
        "--no-progress",
    ])?;

    assert_eq!(payload.get("status").and_then(|v| v.as_str()), Some("ok"));
    let imported: Vec<&str> = payload
        .get("importedFiles")
        .and_then(|v| v.as_array())
        .map(|items| items.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();
    assert_eq!(imported, vec!["src/lib.rs"]);

    let written = fs::read_to_string(&out_path)?;
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 1);
    let record: serde_json::Value = serde_json::from_str(lines[0]).map_err(io::Error::other)?;
    assert_eq!(
        record.get("relativePath").and_then(|v| v.as_str()),
        Some("src/lib.rs")
    );
    Ok(())
}

#[test]
fn info_reports_crate_versions() -> io::Result<()> {
    let payload = run_cli(&["info", "--output", "json"])?;
    assert_eq!(payload.get("status").and_then(|v| v.as_str()), Some("ok"));
    assert_eq!(
        payload.get("name").and_then(|v| v.as_str()),
        Some("code-intake-cli")
    );
    Ok(())
}
