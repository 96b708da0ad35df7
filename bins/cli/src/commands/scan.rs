//! Scan command handler.

use crate::error::{CliError, ExitCode};
use crate::format::OutputMode;
use crate::{CliOutput, envelope_exit_code, format_error_output, run_session};
use code_intake_app::ImportSessionOutput;
use code_intake_config::load_intake_config_std_env;
use code_intake_domain::ExtensionToken;
use std::path::Path;

/// Run the scan command (no delivery).
pub fn run_scan(
    mode: OutputMode,
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
    import_root: &Path,
) -> Result<CliOutput, CliError> {
    let config = match load_intake_config_std_env(config_path, overrides_json) {
        Ok(config) => config,
        Err(error) => return Ok(format_error_output(mode, &error, envelope_exit_code(&error))),
    };

    match run_session(mode, &config, import_root, None, None) {
        Ok(output) => format_scan_output(mode, &output),
        Err(error) => Ok(format_error_output(mode, &error, envelope_exit_code(&error))),
    }
}

fn format_scan_output(
    mode: OutputMode,
    output: &ImportSessionOutput,
) -> Result<CliOutput, CliError> {
    let stdout = if mode.is_ndjson() {
        let payload = serde_json::json!({
            "type": "summary",
            "status": "ok",
            "kind": "scan",
            "rootId": output.root_id.as_str(),
            "summary": summary_json(output),
            "selection": selection_json(output),
            "extensions": extensions_json(output),
            "stageStats": stage_stats_json(output),
        });
        let mut out = serde_json::to_string(&payload)?;
        out.push('\n');
        out
    } else if mode.is_json() {
        let payload = serde_json::json!({
            "status": "ok",
            "rootId": output.root_id.as_str(),
            "summary": summary_json(output),
            "selection": selection_json(output),
            "extensions": extensions_json(output),
            "stageStats": stage_stats_json(output),
        });
        let mut out = serde_json::to_string_pretty(&payload)?;
        out.push('\n');
        out
    } else {
        format_scan_text(output)
    };

    Ok(CliOutput {
        stdout,
        stderr: String::new(),
        exit_code: ExitCode::Ok,
    })
}

fn format_scan_text(output: &ImportSessionOutput) -> String {
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
    out.push_str("selection:");
    for token in output.selection.tokens() {
        out.push(' ');
        out.push_str(token.as_str());
    }
    out.push('\n');
    out.push_str("extensions:\n");
    for row in &output.tally {
        out.push_str("  ");
        out.push_str(row.token.as_str());
        out.push_str(": ");
        out.push_str(&row.count.to_string());
        out.push('\n');
    }
    out.push_str("stageStats:\n");
    out.push_str("  scan: candidates=");
    out.push_str(&output.stage_stats.scan.candidates.to_string());
    out.push_str(" truncated=");
    out.push_str(&output.stage_stats.scan.truncated.to_string());
    out.push_str(" durationMs=");
    out.push_str(&output.stage_stats.scan.duration_ms.to_string());
    out.push('\n');
    out.push_str("  filter: allowed=");
    out.push_str(&output.stage_stats.filter.allowed.to_string());
    out.push_str(" ignored=");
    out.push_str(&output.stage_stats.filter.ignored.to_string());
    out.push_str(" durationMs=");
    out.push_str(&output.stage_stats.filter.duration_ms.to_string());
    out.push('\n');
    out
}

pub(crate) fn summary_json(output: &ImportSessionOutput) -> serde_json::Value {
    serde_json::json!({
        "allowed": output.summary.allowed_count,
        "ignored": output.summary.ignored_count,
        "toImport": output.summary.to_import_count,
    })
}

pub(crate) fn selection_json(output: &ImportSessionOutput) -> serde_json::Value {
    let tokens: Vec<&str> = output.selection.tokens().map(ExtensionToken::as_str).collect();
    serde_json::json!(tokens)
}

pub(crate) fn extensions_json(output: &ImportSessionOutput) -> serde_json::Value {
    let rows: Vec<serde_json::Value> = output
        .tally
        .iter()
        .map(|row| {
            serde_json::json!({
                "token": row.token.as_str(),
                "count": row.count,
            })
        })
        .collect();
    serde_json::json!(rows)
}

pub(crate) fn stage_stats_json(output: &ImportSessionOutput) -> serde_json::Value {
    serde_json::json!({
        "scan": {
            "candidates": output.stage_stats.scan.candidates,
            "truncated": output.stage_stats.scan.truncated,
            "durationMs": output.stage_stats.scan.duration_ms,
        },
        "filter": {
            "allowed": output.stage_stats.filter.allowed,
            "ignored": output.stage_stats.filter.ignored,
            "durationMs": output.stage_stats.filter.duration_ms,
        },
        "deliver": {
            "documents": output.stage_stats.deliver.documents,
            "skipped": output.stage_stats.deliver.skipped,
            "durationMs": output.stage_stats.deliver.duration_ms,
        },
    })
}
