//! CLI binary entrypoint.

mod commands;
mod error;
mod format;

use clap::{Parser, Subcommand};
use code_intake_adapters::fs::{LocalFileSystem, LocalPathPolicy};
use code_intake_adapters::gitignore::GitignoreCompiler;
use code_intake_adapters::log_sink::StderrSink;
use code_intake_adapters::logger::JsonLogger;
use code_intake_app::{ImportSessionDeps, ImportSessionInput, ImportSessionOutput, import_session};
use code_intake_config::{ValidatedIntakeConfig, load_intake_config_std_env, to_pretty_json};
use code_intake_domain::ExtensionToken;
use code_intake_ports::{LoggerPort, ProjectStorePort};
use code_intake_shared::{ErrorEnvelope, ErrorKind, RequestContext};
use commands::{run_import, run_info, run_scan};
use error::{CliError, ExitCode};
use format::{OutputArgs, OutputMode};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(
    name = "cintake",
    version,
    about = "Folder-import CLI: ignore filtering and extension selection",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    output: OutputArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show build and version details.
    Info,
    /// Config-related commands.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Scan an import root and report the would-be import set.
    Scan {
        /// Import root (defaults to current directory).
        #[arg(long)]
        root: Option<PathBuf>,
        /// Optional config file path (JSON/TOML).
        #[arg(long)]
        config: Option<PathBuf>,
        /// Optional JSON overrides (partial config).
        #[arg(long)]
        overrides_json: Option<String>,
    },
    /// Import an import root and deliver documents as JSONL.
    Import {
        /// Import root (defaults to current directory).
        #[arg(long)]
        root: Option<PathBuf>,
        /// Output path for the JSONL delivery.
        #[arg(long, default_value = "intake.jsonl")]
        out: PathBuf,
        /// Extension tokens to import (replaces the default selection).
        #[arg(long = "select", value_name = "EXT")]
        select: Vec<String>,
        /// Optional config file path (JSON/TOML).
        #[arg(long)]
        config: Option<PathBuf>,
        /// Optional JSON overrides (partial config).
        #[arg(long)]
        overrides_json: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommands {
    /// Show the effective config after applying overrides.
    Show {
        /// Optional config file path (JSON/TOML).
        #[arg(long)]
        path: Option<PathBuf>,
        /// Optional JSON overrides (partial config).
        #[arg(long)]
        overrides_json: Option<String>,
    },
    /// Validate config loading and overrides.
    Validate {
        /// Optional config file path (JSON/TOML).
        #[arg(long)]
        path: Option<PathBuf>,
        /// Optional JSON overrides (partial config).
        #[arg(long)]
        overrides_json: Option<String>,
    },
}

pub(crate) struct CliOutput {
    stdout: String,
    stderr: String,
    exit_code: ExitCode,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let mode = OutputMode::from_args(&cli.output);

    match run(&cli.command, mode) {
        Ok(output) => match write_output(&output) {
            Ok(()) => std::process::ExitCode::from(output.exit_code.as_u8()),
            Err(error) => exit_with_error(&error),
        },
        Err(error) => exit_with_error(&error),
    }
}

fn exit_with_error(error: &CliError) -> std::process::ExitCode {
    let _ = writeln!(io::stderr(), "error: {error}");
    std::process::ExitCode::from(error.exit_code().as_u8())
}

fn run(command: &Commands, mode: OutputMode) -> Result<CliOutput, CliError> {
    match command {
        Commands::Info => run_info(mode),
        Commands::Config { command } => match command {
            ConfigCommands::Show {
                path,
                overrides_json,
            } => config_show(mode, path.as_deref(), overrides_json.as_deref()),
            ConfigCommands::Validate {
                path,
                overrides_json,
            } => config_validate(mode, path.as_deref(), overrides_json.as_deref()),
        },
        Commands::Scan {
            root,
            config,
            overrides_json,
        } => {
            let import_root = resolve_import_root(root.as_ref())?;
            run_scan(
                mode,
                config.as_deref(),
                overrides_json.as_deref(),
                &import_root,
            )
        },
        Commands::Import {
            root,
            out,
            select,
            config,
            overrides_json,
        } => {
            let import_root = resolve_import_root(root.as_ref())?;
            run_import(
                mode,
                config.as_deref(),
                overrides_json.as_deref(),
                &import_root,
                out,
                select,
            )
        },
    }
}

fn config_show(
    mode: OutputMode,
    path: Option<&Path>,
    overrides_json: Option<&str>,
) -> Result<CliOutput, CliError> {
    match load_intake_config_std_env(path, overrides_json) {
        Ok(validated) => {
            let rendered = match to_pretty_json(validated.config()) {
                Ok(rendered) => rendered,
                Err(error) => {
                    return Ok(format_error_output(mode, &error, envelope_exit_code(&error)));
                },
            };
            Ok(CliOutput {
                stdout: rendered,
                stderr: String::new(),
                exit_code: ExitCode::Ok,
            })
        },
        Err(error) => Ok(format_error_output(mode, &error, envelope_exit_code(&error))),
    }
}

fn config_validate(
    mode: OutputMode,
    path: Option<&Path>,
    overrides_json: Option<&str>,
) -> Result<CliOutput, CliError> {
    match load_intake_config_std_env(path, overrides_json) {
        Ok(_) => Ok(CliOutput {
            stdout: if mode.is_ndjson() {
                "{\"type\":\"summary\",\"status\":\"ok\",\"kind\":\"configValidate\"}\n".to_string()
            } else if mode.is_json() {
                "{\n  \"status\": \"ok\"\n}\n".to_string()
            } else {
                "status: ok\n".to_string()
            },
            stderr: String::new(),
            exit_code: ExitCode::Ok,
        }),
        Err(error) => Ok(format_error_output(mode, &error, envelope_exit_code(&error))),
    }
}

fn resolve_import_root(path: Option<&PathBuf>) -> Result<PathBuf, CliError> {
    match path {
        Some(value) => Ok(value.clone()),
        None => Ok(std::env::current_dir()?),
    }
}

/// Compose adapters and run one import session on a current-thread runtime.
pub(crate) fn run_session(
    mode: OutputMode,
    config: &ValidatedIntakeConfig,
    import_root: &Path,
    store: Option<Arc<dyn ProjectStorePort>>,
    selection_override: Option<Vec<ExtensionToken>>,
) -> Result<ImportSessionOutput, ErrorEnvelope> {
    let logger: Option<Arc<dyn LoggerPort>> = if mode.no_progress {
        None
    } else {
        Some(Arc::new(JsonLogger::new(Arc::new(StderrSink::new()))))
    };

    let deps = ImportSessionDeps {
        filesystem: Arc::new(LocalFileSystem::new(config.max_file_size_bytes())),
        path_policy: Arc::new(LocalPathPolicy::new()),
        ignore_compiler: Arc::new(GitignoreCompiler::new()),
        store,
        logger,
    };

    let input = ImportSessionInput {
        import_root: import_root.to_path_buf(),
        candidate_list: None,
        ignore_file_name: config.ignore_file_name().into(),
        extra_ignore_patterns: config
            .extra_ignore_patterns()
            .iter()
            .map(|pattern| pattern.clone().into_boxed_str())
            .collect(),
        selection_override: selection_override
            .or_else(|| config.selection_override().map(<[ExtensionToken]>::to_vec)),
        max_files: config.max_files(),
        max_file_size_bytes: config.max_file_size_bytes(),
        on_progress: None,
    };

    let ctx = RequestContext::new_request();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(ErrorEnvelope::from)?;
    runtime.block_on(async { import_session(&ctx, &deps, input).await })
}

pub(crate) fn format_error_output(
    mode: OutputMode,
    error: &ErrorEnvelope,
    exit_code: ExitCode,
) -> CliOutput {
    let stdout = if mode.is_ndjson() {
        let payload = serde_json::json!({
            "type": "summary",
            "status": "error",
            "error": {
                "code": error.code.to_string(),
                "message": error.message,
            },
        });
        serde_json::to_string(&payload).map_or_else(
            |_| "{\"type\":\"summary\",\"status\":\"error\"}\n".to_string(),
            |mut out| {
                out.push('\n');
                out
            },
        )
    } else if mode.is_json() {
        let payload = serde_json::json!({
            "status": "error",
            "error": {
                "code": error.code.to_string(),
                "message": error.message,
            },
        });
        serde_json::to_string_pretty(&payload).map_or_else(
            |_| "{\"status\":\"error\"}\n".to_string(),
            |mut out| {
                out.push('\n');
                out
            },
        )
    } else {
        format!(
            "status: error\ncode: {}\nmessage: {}\n",
            error.code, error.message
        )
    };

    CliOutput {
        stdout,
        stderr: String::new(),
        exit_code,
    }
}

pub(crate) fn envelope_exit_code(error: &ErrorEnvelope) -> ExitCode {
    match error.kind {
        ErrorKind::Expected => ExitCode::InvalidInput,
        ErrorKind::Unexpected => ExitCode::Io,
        ErrorKind::Invariant => ExitCode::Internal,
    }
}

fn write_output(output: &CliOutput) -> Result<(), CliError> {
    let mut stdout = io::stdout();
    stdout.write_all(output.stdout.as_bytes())?;

    if !output.stderr.is_empty() {
        let mut stderr = io::stderr();
        stderr.write_all(output.stderr.as_bytes())?;
        stderr.flush()?;
    }

    Ok(())
}
