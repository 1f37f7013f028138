//! Changelog command: thin CLI layer over `cikit_core::changelog`.

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::{OwoColorize, Stream};
use tracing::{debug, instrument};

use cikit_core::changelog::{self, ChangelogUpdate};
use cikit_core::config::Config;

/// Arguments for the `changelog` subcommand.
#[derive(Args, Debug)]
pub struct ChangelogArgs {
    /// Changelog file (default: from config, else `CHANGELOG.md`)
    #[arg(long, value_name = "FILE")]
    pub changelog: Option<Utf8PathBuf>,

    /// Release version (e.g. 1.3.0)
    #[arg(long)]
    pub version: String,

    /// Release date, inserted verbatim (e.g. 2024-01-01)
    #[arg(long)]
    pub date: String,

    /// Line to insert the heading after (default: `## [Unreleased]`)
    #[arg(long)]
    pub marker: Option<String>,

    /// Print the updated changelog instead of writing it
    #[arg(long)]
    pub dry_run: bool,
}

/// Execute the changelog command.
#[instrument(name = "cmd_changelog", skip_all, fields(version = %args.version))]
pub fn cmd_changelog(
    args: ChangelogArgs,
    global_json: bool,
    config: &Config,
) -> anyhow::Result<()> {
    let update = ChangelogUpdate {
        path: config.changelog_path(args.changelog),
        marker: config.changelog_marker(args.marker),
        version: args.version,
        date: args.date,
        dry_run: args.dry_run,
    };
    debug!(
        path = %update.path,
        marker = %update.marker,
        dry_run = update.dry_run,
        "executing changelog command"
    );

    let outcome = changelog::update_changelog(&update)
        .with_context(|| format!("failed to update {}", update.path))?;

    if global_json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    if let Some(content) = &outcome.content {
        print!("{content}");
        return Ok(());
    }

    println!(
        "{} Added {} ({}) to {}",
        "✓".if_supports_color(Stream::Stdout, |t| t.green()),
        update.version,
        update.date,
        outcome.path
    );
    if !outcome.links_rewritten {
        println!(
            "  {}",
            "tagged releases left unchanged".if_supports_color(Stream::Stdout, |t| t.dimmed())
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const CHANGELOG: &str = "\
# Changelog

## [Unreleased]

## [1.0.0] - 2023-01-01
";

    fn changelog_path(tmp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::try_from(tmp.path().join("CHANGELOG.md")).unwrap()
    }

    fn args(path: Utf8PathBuf) -> ChangelogArgs {
        ChangelogArgs {
            changelog: Some(path),
            version: "1.1.0".to_string(),
            date: "2024-01-01".to_string(),
            marker: None,
            dry_run: false,
        }
    }

    #[test]
    fn writes_heading() {
        let tmp = TempDir::new().unwrap();
        let path = changelog_path(&tmp);
        fs::write(&path, CHANGELOG).unwrap();

        cmd_changelog(args(path.clone()), false, &Config::default()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("## [1.1.0] - 2024-01-01"));
    }

    #[test]
    fn dry_run_leaves_file_alone() {
        let tmp = TempDir::new().unwrap();
        let path = changelog_path(&tmp);
        fs::write(&path, CHANGELOG).unwrap();

        let mut args = args(path.clone());
        args.dry_run = true;
        cmd_changelog(args, true, &Config::default()).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), CHANGELOG);
    }

    #[test]
    fn missing_file_reports_path() {
        let tmp = TempDir::new().unwrap();
        let path = changelog_path(&tmp);

        let err = cmd_changelog(args(path.clone()), false, &Config::default()).unwrap_err();
        assert_eq!(err.to_string(), format!("failed to update {path}"));
        assert_eq!(err.root_cause().to_string(), format!("{path} not found"));
    }
}
