//! Detect optional quality tools declared as project dependencies.
//!
//! Dependencies are gathered from three places in `pyproject.toml`:
//!
//! - `[project] dependencies`
//! - every list under `[project.optional-dependencies]`
//! - every list under `[dependency-groups]`
//!
//! Each specifier is reduced to its leading package name (see [`normalize`])
//! before the membership test, so `"ruff>=0.4"` and `"RUFF"` both count.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use camino::Utf8Path;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::error::PyprojectResult;
use crate::pyproject::Pyproject;

static PACKAGE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+").expect("valid regex"));

/// Which quality tools a project declares.
///
/// Field order is the output order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QualityTools {
    /// `ruff` linter/formatter.
    pub ruff: bool,
    /// `mypy` type checker.
    pub mypy: bool,
    /// `pytest` test runner.
    pub pytest: bool,
}

impl QualityTools {
    /// Names of the tools, in output order.
    pub const NAMES: [&'static str; 3] = ["ruff", "mypy", "pytest"];

    /// Flag each tool present in a set of normalized dependency names.
    pub fn from_dependencies(deps: &BTreeSet<String>) -> Self {
        let [ruff, mypy, pytest] = Self::NAMES.map(|name| deps.contains(name));
        Self { ruff, mypy, pytest }
    }

    /// `(name, enabled)` pairs in output order.
    pub const fn outputs(&self) -> [(&'static str, bool); 3] {
        let [ruff, mypy, pytest] = Self::NAMES;
        [(ruff, self.ruff), (mypy, self.mypy), (pytest, self.pytest)]
    }
}

/// Result of scanning a manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolScan {
    /// Whether the manifest existed. When `false`, every tool is disabled.
    pub manifest_found: bool,
    /// Detected tools.
    pub tools: QualityTools,
}

/// Load `path` and report which quality tools it declares.
///
/// A missing manifest disables every tool instead of failing.
#[instrument(skip_all, fields(%path))]
pub fn detect_tools(path: &Utf8Path) -> PyprojectResult<ToolScan> {
    let Some(pyproject) = Pyproject::load(path)? else {
        info!("pyproject not found, disabling all quality tools");
        return Ok(ToolScan {
            manifest_found: false,
            tools: QualityTools::default(),
        });
    };

    let deps = collect_dependencies(&pyproject);
    debug!(count = deps.len(), "collected dependencies");

    let tools = QualityTools::from_dependencies(&deps);
    debug!(?tools, "detected quality tools");

    Ok(ToolScan {
        manifest_found: true,
        tools,
    })
}

/// Gather normalized names from every dependency source in the manifest.
pub fn collect_dependencies(pyproject: &Pyproject) -> BTreeSet<String> {
    let direct = pyproject
        .get(&["project", "dependencies"])
        .into_iter()
        .flat_map(specifiers);

    let optional = pyproject
        .table(&["project", "optional-dependencies"])
        .into_iter()
        .flat_map(|extras| extras.values())
        .flat_map(specifiers);

    let groups = pyproject
        .table(&["dependency-groups"])
        .into_iter()
        .flat_map(|groups| groups.values())
        .flat_map(specifiers);

    direct
        .chain(optional)
        .chain(groups)
        .filter_map(normalize)
        .collect()
}

/// String items of a dependency list.
///
/// Non-list values yield nothing. Non-string items (such as
/// `{include-group = "..."}`) are skipped.
fn specifiers(value: &toml::Value) -> impl Iterator<Item = &str> {
    value
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|item| {
            let spec = item.as_str();
            if spec.is_none() {
                debug!(?item, "skipping non-string dependency entry");
            }
            spec
        })
}

/// Reduce a dependency specifier to its lower-cased package name.
///
/// Takes the leading run of `[A-Za-z0-9_.-]` after trimming. Returns `None`
/// if there is none.
pub fn normalize(spec: &str) -> Option<String> {
    PACKAGE_NAME
        .find(spec.trim())
        .map(|name| name.as_str().to_lowercase())
}
