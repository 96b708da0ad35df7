//! Info command handler.

use crate::CliOutput;
use crate::error::{CliError, ExitCode};
use crate::format::OutputMode;
use code_intake_adapters::adapters_crate_version;
use code_intake_app::app_crate_version;
use code_intake_config::config_crate_version;
use code_intake_domain::domain_crate_version;
use code_intake_ports::ports_crate_version;
use code_intake_shared::shared_crate_version;

/// Run the info command.
pub fn run_info(mode: OutputMode) -> Result<CliOutput, CliError> {
    let stdout = if mode.is_ndjson() {
        let mut out = serde_json::to_string(&info_payload(true))?;
        out.push('\n');
        out
    } else if mode.is_json() {
        let mut out = serde_json::to_string_pretty(&info_payload(false))?;
        out.push('\n');
        out
    } else {
        format_info_text()
    };

    Ok(CliOutput {
        stdout,
        stderr: String::new(),
        exit_code: ExitCode::Ok,
    })
}

fn info_payload(ndjson: bool) -> serde_json::Value {
    let crates = serde_json::json!({
        "shared": shared_crate_version(),
        "domain": domain_crate_version(),
        "ports": ports_crate_version(),
        "config": config_crate_version(),
        "adapters": adapters_crate_version(),
        "app": app_crate_version(),
    });
    if ndjson {
        serde_json::json!({
            "type": "summary",
            "status": "ok",
            "kind": "info",
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "crates": crates,
        })
    } else {
        serde_json::json!({
            "status": "ok",
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "crates": crates,
        })
    }
}

fn format_info_text() -> String {
    format!(
        "status: ok\nname: {}\nversion: {}\nshared: {}\ndomain: {}\nports: {}\nconfig: {}\nadapters: {}\napp: {}\n",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        shared_crate_version(),
        domain_crate_version(),
        ports_crate_version(),
        config_crate_version(),
        adapters_crate_version(),
        app_crate_version(),
    )
}
