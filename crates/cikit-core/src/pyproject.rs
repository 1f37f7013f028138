//! Read-only access to `pyproject.toml`.
//!
//! The manifest is parsed once per invocation into a [`Pyproject`], which
//! offers path lookups that treat any non-table on the way as "absent".

use camino::Utf8Path;
use tracing::{debug, instrument};

use crate::error::{PyprojectError, PyprojectResult};

/// Default manifest file name.
pub const DEFAULT_PYPROJECT: &str = "pyproject.toml";

/// A parsed `pyproject.toml`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pyproject {
    table: toml::Table,
}

impl Pyproject {
    /// Load the manifest at `path`.
    ///
    /// Returns `Ok(None)` when the file does not exist. Syntax errors are
    /// returned as [`PyprojectError::Parse`].
    #[instrument(skip_all, fields(%path))]
    pub fn load(path: &Utf8Path) -> PyprojectResult<Option<Self>> {
        if !path.exists() {
            debug!("pyproject not found");
            return Ok(None);
        }

        let text = std::fs::read_to_string(path).map_err(|source| PyprojectError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&text)
            .map(Some)
            .map_err(|source| PyprojectError::Parse {
                path: path.to_path_buf(),
                source: Box::new(source),
            })
    }

    /// Parse manifest text.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        let table = toml::from_str::<toml::Table>(text)?;
        Ok(Self { table })
    }

    /// Look up a nested value, e.g. `get(&["tool", "mypy", "files"])`.
    pub fn get(&self, keys: &[&str]) -> Option<&toml::Value> {
        let (last, parents) = keys.split_last()?;
        let mut table = &self.table;
        for key in parents {
            table = table.get(*key)?.as_table()?;
        }
        table.get(*last)
    }

    /// Look up a nested table; `None` if absent or not a table.
    pub fn table(&self, keys: &[&str]) -> Option<&toml::Table> {
        if keys.is_empty() {
            return Some(&self.table);
        }
        self.get(keys)?.as_table()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn utf8_tmp(tmp: &TempDir) -> &Utf8Path {
        Utf8Path::from_path(tmp.path()).expect("tempdir is UTF-8")
    }

    #[test]
    fn missing_file_is_none() {
        let tmp = TempDir::new().unwrap();
        let path = utf8_tmp(&tmp).join("pyproject.toml");
        assert!(Pyproject::load(&path).unwrap().is_none());
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = utf8_tmp(&tmp).join("pyproject.toml");
        fs::write(&path, "[tool.mypy\nfiles = ").unwrap();

        let err = Pyproject::load(&path).unwrap_err();
        assert!(matches!(err, PyprojectError::Parse { .. }));
        assert!(err.to_string().contains("pyproject.toml"));
    }

    #[test]
    fn nested_lookup() {
        let doc = Pyproject::parse("[tool.mypy]\nfiles = [\"src\"]\n").unwrap();
        let files = doc.get(&["tool", "mypy", "files"]).unwrap();
        assert!(files.is_array());
        assert!(doc.get(&["tool", "ruff"]).is_none());
    }

    #[test]
    fn non_table_parent_is_absent() {
        let doc = Pyproject::parse("tool = \"oops\"\n").unwrap();
        assert!(doc.get(&["tool", "mypy", "files"]).is_none());
        assert!(doc.table(&["tool"]).is_none());
    }

    #[test]
    fn empty_keys_yield_nothing() {
        let doc = Pyproject::parse("a = 1\n").unwrap();
        assert!(doc.get(&[]).is_none());
        assert_eq!(doc.table(&[]).map(toml::Table::len), Some(1));
    }
}
