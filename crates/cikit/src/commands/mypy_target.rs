//! Mypy target command: thin CLI layer over `cikit_core::mypy`.

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Args;
use tracing::{debug, instrument};

use cikit_core::config::Config;
use cikit_core::mypy;
use cikit_core::outputs::OutputSink;

/// Arguments for the `mypy-target` subcommand.
#[derive(Args, Debug, Default)]
pub struct MypyTargetArgs {
    /// Path to pyproject.toml (default: from config, else `pyproject.toml`)
    #[arg(long, value_name = "FILE")]
    pub pyproject: Option<Utf8PathBuf>,
}

/// Execute the mypy-target command.
#[instrument(name = "cmd_mypy_target", skip_all)]
pub fn cmd_mypy_target(
    args: MypyTargetArgs,
    global_json: bool,
    config: &Config,
    sink: Option<&OutputSink>,
) -> anyhow::Result<()> {
    let pyproject = config.pyproject_path(args.pyproject);
    debug!(%pyproject, json_output = global_json, "executing mypy-target command");

    let use_dot = mypy::decide_use_dot(&pyproject)
        .with_context(|| format!("failed to read mypy settings from {pyproject}"))?;

    let results = [(mypy::USE_DOT_KEY, use_dot)];
    super::write_outputs(sink, &results)?;

    if global_json {
        let report = serde_json::json!({
            "pyproject": pyproject,
            "use_dot": use_dot,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        super::print_outputs(&results);
    }

    Ok(())
}
