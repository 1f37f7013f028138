//! `key=value` step outputs.
//!
//! CI runners hand each step a file (GitHub Actions exports its path as
//! `GITHUB_OUTPUT`) and read `key=value` lines appended to it once the step
//! finishes. The sink path is always passed in explicitly.

use std::fs::OpenOptions;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, instrument};

use crate::error::OutputError;

/// Render a single output line (without trailing newline).
pub fn format_output(key: &str, value: bool) -> String {
    format!("{key}={value}")
}

/// A file that receives `key=value` lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSink {
    path: Utf8PathBuf,
}

impl OutputSink {
    /// Create a sink that appends to `path`.
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Build a sink from an optional path; empty paths count as unset.
    pub fn from_option(path: Option<Utf8PathBuf>) -> Option<Self> {
        path.filter(|p| !p.as_str().is_empty()).map(Self::new)
    }

    /// Path of the sink file.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Append one line per output, creating the file if needed.
    #[instrument(skip_all, fields(path = %self.path, count = outputs.len()))]
    pub fn append(&self, outputs: &[(&str, bool)]) -> Result<(), OutputError> {
        let to_err = |source: std::io::Error| OutputError {
            path: self.path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(to_err)?;

        let body: String = outputs
            .iter()
            .map(|(key, value)| format_output(key, *value) + "\n")
            .collect();
        file.write_all(body.as_bytes()).map_err(to_err)?;

        debug!("appended outputs");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn format_uses_lowercase_bools() {
        assert_eq!(format_output("use_dot", true), "use_dot=true");
        assert_eq!(format_output("ruff", false), "ruff=false");
    }

    #[test]
    fn append_creates_and_appends() {
        let tmp = TempDir::new().unwrap();
        let path = Utf8Path::from_path(tmp.path()).unwrap().join("out");
        fs::write(&path, "existing=1\n").unwrap();

        let sink = OutputSink::new(&path);
        sink.append(&[("ruff", true), ("mypy", false)]).unwrap();
        sink.append(&[("use_dot", true)]).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "existing=1\nruff=true\nmypy=false\nuse_dot=true\n"
        );
    }

    #[test]
    fn append_to_missing_directory_fails() {
        let tmp = TempDir::new().unwrap();
        let path = Utf8Path::from_path(tmp.path())
            .unwrap()
            .join("missing")
            .join("out");
        let err = OutputSink::new(&path).append(&[("x", true)]).unwrap_err();
        assert_eq!(err.path, path);
    }

    #[test]
    fn empty_path_is_unset() {
        assert!(OutputSink::from_option(Some(Utf8PathBuf::new())).is_none());
        assert!(OutputSink::from_option(None).is_none());
        assert!(OutputSink::from_option(Some("out.txt".into())).is_some());
    }
}
