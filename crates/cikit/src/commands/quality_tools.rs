//! Quality tools command: thin CLI layer over `cikit_core::quality`.

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;
use tracing::{debug, instrument};

use cikit_core::config::Config;
use cikit_core::outputs::OutputSink;
use cikit_core::quality::{self, QualityTools};

/// Arguments for the `quality-tools` subcommand.
#[derive(Args, Debug, Default)]
pub struct QualityToolsArgs {
    /// Path to pyproject.toml (default: from config, else `pyproject.toml`)
    #[arg(long, value_name = "FILE")]
    pub pyproject: Option<Utf8PathBuf>,
}

#[derive(Serialize)]
struct QualityReport {
    pyproject: Utf8PathBuf,
    found: bool,
    tools: QualityTools,
}

/// Execute the quality-tools command.
#[instrument(name = "cmd_quality_tools", skip_all)]
pub fn cmd_quality_tools(
    args: QualityToolsArgs,
    global_json: bool,
    config: &Config,
    sink: Option<&OutputSink>,
) -> anyhow::Result<()> {
    let pyproject = config.pyproject_path(args.pyproject);
    debug!(%pyproject, json_output = global_json, "executing quality-tools command");

    let scan = quality::detect_tools(&pyproject)
        .with_context(|| format!("failed to read dependencies from {pyproject}"))?;

    if !scan.manifest_found {
        eprintln!(
            "{} {pyproject} not found; disabling all quality tools",
            "warning:".if_supports_color(Stream::Stderr, |t| t.yellow())
        );
    }

    let results = scan.tools.outputs();
    super::write_outputs(sink, &results)?;

    if global_json {
        let report = QualityReport {
            pyproject,
            found: scan.manifest_found,
            tools: scan.tools,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        super::print_outputs(&results);
        println!("Detected tools: {}", serde_json::to_string(&scan.tools)?);
    }

    Ok(())
}
