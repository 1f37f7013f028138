//! Command implementations

pub mod changelog;

pub mod mypy_target;

pub mod quality_tools;

use anyhow::Context;
use cikit_core::outputs::{self, OutputSink};

/// Append results to the step output file, if one was given.
///
/// Shared by the commands that report `key=value` facts (mypy-target,
/// quality-tools). The sink always gets plain lines, even under `--json`.
pub fn write_outputs(sink: Option<&OutputSink>, results: &[(&str, bool)]) -> anyhow::Result<()> {
    let Some(sink) = sink else {
        return Ok(());
    };
    sink.append(results)
        .with_context(|| format!("failed to append outputs to {}", sink.path()))
}

/// Print results as `key=value` lines on stdout.
pub fn print_outputs(results: &[(&str, bool)]) {
    for (key, value) in results {
        println!("{}", outputs::format_output(key, *value));
    }
}
