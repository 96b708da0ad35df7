//! Import command handler.

use crate::commands::scan::{extensions_json, selection_json, stage_stats_json, summary_json};
use crate::error::{CliError, ExitCode};
use crate::format::OutputMode;
use crate::{CliOutput, envelope_exit_code, format_error_output, run_session};
use code_intake_adapters::store::JsonlProjectStore;
use code_intake_app::ImportSessionOutput;
use code_intake_config::load_intake_config_std_env;
use code_intake_domain::ExtensionToken;
use code_intake_ports::ProjectStorePort;
use std::path::Path;
use std::sync::Arc;

/// Run the import command (full pipeline with JSONL delivery).
pub fn run_import(
    mode: OutputMode,
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
    import_root: &Path,
    out_path: &Path,
    select: &[String],
) -> Result<CliOutput, CliError> {
    let config = match load_intake_config_std_env(config_path, overrides_json) {
        Ok(config) => config,
        Err(error) => return Ok(format_error_output(mode, &error, envelope_exit_code(&error))),
    };

    let selection_override = parse_selection(select)?;
    let store: Arc<dyn ProjectStorePort> =
        Arc::new(JsonlProjectStore::new(out_path.to_path_buf()));

    match run_session(mode, &config, import_root, Some(store), selection_override) {
        Ok(output) => format_import_output(mode, &output, out_path),
        Err(error) => Ok(format_error_output(mode, &error, envelope_exit_code(&error))),
    }
}

fn parse_selection(select: &[String]) -> Result<Option<Vec<ExtensionToken>>, CliError> {
    if select.is_empty() {
        return Ok(None);
    }
    let mut tokens = Vec::with_capacity(select.len());
    for raw in select {
        let token = ExtensionToken::parse(raw)
            .map_err(|error| CliError::InvalidInput(error.to_string()))?;
        tokens.push(token);
    }
    tokens.sort();
    tokens.dedup();
    Ok(Some(tokens))
}

fn format_import_output(
    mode: OutputMode,
    output: &ImportSessionOutput,
    out_path: &Path,
) -> Result<CliOutput, CliError> {
    let stdout = if mode.is_ndjson() {
        let payload = serde_json::json!({
            "type": "summary",
            "status": "ok",
            "kind": "import",
            "rootId": output.root_id.as_str(),
            "outPath": out_path.display().to_string(),
            "summary": summary_json(output),
            "selection": selection_json(output),
            "extensions": extensions_json(output),
            "importedFiles": output.imported_files,
            "stageStats": stage_stats_json(output),
        });
        let mut out = serde_json::to_string(&payload)?;
        out.push('\n');
        out
    } else if mode.is_json() {
        let payload = serde_json::json!({
            "status": "ok",
            "rootId": output.root_id.as_str(),
            "outPath": out_path.display().to_string(),
            "summary": summary_json(output),
            "selection": selection_json(output),
            "extensions": extensions_json(output),
            "importedFiles": output.imported_files,
            "stageStats": stage_stats_json(output),
        });
        let mut out = serde_json::to_string_pretty(&payload)?;
        out.push('\n');
        out
    } else {
        format_import_text(output, out_path)
    };

    Ok(CliOutput {
        stdout,
        stderr: String::new(),
        exit_code: ExitCode::Ok,
    })
}

fn format_import_text(output: &ImportSessionOutput, out_path: &Path) -> String {
    let mut out = String::new();
    out.push_str("status: ok\n");
    out.push_str("rootId: ");
    out.push_str(output.root_id.as_str());
    out.push('\n');
    out.push_str("allowed: ");
    out.push_str(&output.summary.allowed_count.to_string());
    out.push('\n');
    out.push_str("ignored: ");
    out.push_str(&output.summary.ignored_count.to_string());
    out.push('\n');
    out.push_str("toImport: ");
    out.push_str(&output.summary.to_import_count.to_string());
    out.push('\n');
    out.push_str("delivered: ");
    out.push_str(&output.stage_stats.deliver.documents.to_string());
    out.push('\n');
    out.push_str("skipped: ");
    out.push_str(&output.stage_stats.deliver.skipped.to_string());
    out.push('\n');
    out.push_str("out: ");
    out.push_str(&out_path.display().to_string());
    out.push('\n');
    out
}
