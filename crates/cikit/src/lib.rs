//! Library interface for the `cikit` CLI.
//!
//! This crate exposes the CLI's argument parser and command structure as a library,
//! mainly so its parser can be tested. The actual entry point is
//! in `main.rs`.
//!
//! # Structure
//!
//! - [`Cli`] - The root argument parser (clap derive)
//! - [`Commands`] - Available subcommands
//! - [`commands`] - Command implementations

pub mod commands;

use camino::Utf8PathBuf;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

/// Color output preference.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect terminal capabilities automatically.
    #[default]
    Auto,
    /// Always emit colors.
    Always,
    /// Never emit colors.
    Never,
}

impl ColorChoice {
    /// Configure global color output based on this choice.
    ///
    /// Call this once at startup to set the color mode.
    pub fn apply(self) {
        match self {
            Self::Auto => {} // owo-colors auto-detects by default
            Self::Always => owo_colors::set_override(true),
            Self::Never => owo_colors::set_override(false),
        }
    }
}

const ENV_HELP: &str = "\
ENVIRONMENT VARIABLES:
    GITHUB_OUTPUT           Step output file (same as --github-output)
    RUST_LOG                Log filter (e.g., debug, cikit_core=trace)
    CIKIT_LOG_PATH          Write JSONL logs to this file
    CIKIT_LOG_DIR           Write JSONL logs to cikit.jsonl in this directory
";

/// Command-line interface definition for cikit.
#[derive(Parser)]
#[command(name = "cikit")]
#[command(about = "CI helpers for Python projects", long_about = None)]
#[command(version)]
#[command(after_long_help = ENV_HELP)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file (overrides discovery)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run as if started in DIR
    #[arg(short = 'C', long, global = true)]
    pub chdir: Option<PathBuf>,

    /// Append `key=value` results to FILE
    #[arg(long, global = true, env = "GITHUB_OUTPUT", value_name = "FILE")]
    pub github_output: Option<Utf8PathBuf>,

    /// Only print errors (suppresses warnings/info)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// More detail (repeatable; e.g. -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Colorize output
    #[arg(long, global = true, value_enum, default_value_t)]
    pub color: ColorChoice,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,
}

/// Available subcommands for the CLI.
#[derive(Subcommand)]
pub enum Commands {
    /// Decide whether mypy should be run with `.` as its target
    MypyTarget(commands::mypy_target::MypyTargetArgs),

    /// Detect ruff, mypy, and pytest among declared dependencies
    QualityTools(commands::quality_tools::QualityToolsArgs),

    /// Add a release heading to the changelog and update tagged release links
    Changelog(commands::changelog::ChangelogArgs),
}

/// Returns the clap command definition
pub fn command() -> clap::Command {
    Cli::command()
}
