//! Decide whether mypy should be run against `.`.
//!
//! When `[tool.mypy] files` is configured, mypy already knows what to check
//! and passing `.` would override it. Otherwise the workflow must supply the
//! wildcard target itself.

use camino::Utf8Path;
use tracing::{debug, instrument};

use crate::error::PyprojectResult;
use crate::pyproject::Pyproject;

/// Output key for the decision.
pub const USE_DOT_KEY: &str = "use_dot";

const FILES_KEY: &[&str] = &["tool", "mypy", "files"];

/// Load `path` and decide whether mypy should be given `.` as its target.
///
/// A missing manifest means "use `.`". Parse errors propagate.
#[instrument(skip_all, fields(%path))]
pub fn decide_use_dot(path: &Utf8Path) -> PyprojectResult<bool> {
    let pyproject = Pyproject::load(path)?;
    let use_dot = use_dot(pyproject.as_ref());
    debug!(use_dot, "decided mypy target");
    Ok(use_dot)
}

/// Decide from an already-loaded manifest (`None` = no manifest).
pub fn use_dot(pyproject: Option<&Pyproject>) -> bool {
    pyproject
        .and_then(|doc| doc.get(FILES_KEY))
        .is_none_or(|files| !has_explicit_files(files))
}

/// Whether a `files` value names at least one target.
///
/// Blank strings and lists of blank strings do not count. Non-string list
/// items and values of any other type do.
fn has_explicit_files(files: &toml::Value) -> bool {
    match files {
        toml::Value::String(s) => !s.trim().is_empty(),
        toml::Value::Array(items) => items.iter().any(|item| match item {
            toml::Value::String(s) => !s.trim().is_empty(),
            _ => true,
        }),
        _ => true,
    }
}
