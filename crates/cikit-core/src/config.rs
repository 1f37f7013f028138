//! Configuration loading and discovery.
//!
//! cikit reads its own settings (log level, default file locations) from an
//! optional config file. This is separate from the `pyproject.toml` the
//! commands inspect.
//!
//! # Supported formats
//!
//! - TOML (`.toml`)
//! - YAML (`.yaml`, `.yml`)
//! - JSON (`.json`)
//!
//! # Config file locations (in order of precedence, highest first):
//! - files passed with `--config`
//! - `.cikit.<ext>` in current directory or any parent
//! - `cikit.<ext>` in current directory or any parent
//! - `~/.config/cikit/config.<ext>` (user config)
//!
//! Directory traversal stops after the first directory containing `.git`.
//!
//! # Example
//! ```toml
//! log_level = "debug"
//!
//! [pyproject]
//! path = "backend/pyproject.toml"
//!
//! [changelog]
//! path = "docs/CHANGELOG.md"
//! marker = "<!-- next release -->"
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};

use crate::changelog::{DEFAULT_CHANGELOG, DEFAULT_MARKER};
use crate::error::{ConfigError, ConfigResult};
use crate::pyproject::DEFAULT_PYPROJECT;

/// The configuration for cikit.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Log level for the application (e.g., "debug", "info", "warn", "error").
    pub log_level: LogLevel,
    /// Directory for JSONL log files. Logs go to stderr when unset.
    pub log_dir: Option<Utf8PathBuf>,
    /// Where to find `pyproject.toml`.
    pub pyproject: Option<PyprojectConfig>,
    /// Changelog defaults.
    pub changelog: Option<ChangelogConfig>,
}

/// `[pyproject]` section.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PyprojectConfig {
    /// Manifest path (default: `pyproject.toml`).
    pub path: Option<Utf8PathBuf>,
}

/// `[changelog]` section.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ChangelogConfig {
    /// Changelog path (default: `CHANGELOG.md`).
    pub path: Option<Utf8PathBuf>,
    /// Insertion marker (default: `## [Unreleased]`).
    pub marker: Option<String>,
}

impl Config {
    /// Resolve the manifest path: CLI flag, then config, then default.
    pub fn pyproject_path(&self, flag: Option<Utf8PathBuf>) -> Utf8PathBuf {
        flag.or_else(|| self.pyproject.as_ref().and_then(|p| p.path.clone()))
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_PYPROJECT))
    }

    /// Resolve the changelog path: CLI flag, then config, then default.
    pub fn changelog_path(&self, flag: Option<Utf8PathBuf>) -> Utf8PathBuf {
        flag.or_else(|| self.changelog.as_ref().and_then(|c| c.path.clone()))
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_CHANGELOG))
    }

    /// Resolve the changelog marker: CLI flag, then config, then default.
    pub fn changelog_marker(&self, flag: Option<String>) -> String {
        flag.or_else(|| self.changelog.as_ref().and_then(|c| c.marker.clone()))
            .unwrap_or_else(|| DEFAULT_MARKER.to_owned())
    }
}

/// Log level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Verbose output for debugging.
    Debug,
    /// Operational information.
    Info,
    /// Warnings only (default, keeps CI logs quiet).
    #[default]
    Warn,
    /// Errors only.
    Error,
}

impl LogLevel {
    /// Returns the log level as a lowercase string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Supported configuration file extensions (in order of preference).
const CONFIG_EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "json"];

/// Application name for XDG directory lookup and config file names.
const APP_NAME: &str = "cikit";

/// Builder for loading configuration from multiple sources.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    project_search_root: Option<Utf8PathBuf>,
    include_user_config: bool,
    boundary_marker: Option<String>,
    explicit_files: Vec<Utf8PathBuf>,
}

impl ConfigLoader {
    /// Create a loader that includes user config and stops at `.git`.
    pub fn new() -> Self {
        Self {
            project_search_root: None,
            include_user_config: true,
            boundary_marker: Some(".git".to_string()),
            explicit_files: Vec::new(),
        }
    }

    /// Walk up from `path` looking for a project config file.
    pub fn with_project_search<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.project_search_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set whether to include user config from `~/.config/cikit/`.
    pub const fn with_user_config(mut self, include: bool) -> Self {
        self.include_user_config = include;
        self
    }

    /// Stop directory traversal at a parent containing `marker`.
    pub fn with_boundary_marker<S: Into<String>>(mut self, marker: S) -> Self {
        self.boundary_marker = Some(marker.into());
        self
    }

    /// Search all the way to the filesystem root.
    pub fn without_boundary_marker(mut self) -> Self {
        self.boundary_marker = None;
        self
    }

    /// Add an explicit config file. Later files take precedence.
    pub fn with_file<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.explicit_files.push(path.as_ref().to_path_buf());
        self
    }

    /// Load configuration, merging all discovered sources.
    #[tracing::instrument(skip(self), fields(search_root = ?self.project_search_root))]
    pub fn load(self) -> ConfigResult<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if self.include_user_config
            && let Some(user_config) = find_user_config()
        {
            tracing::debug!(%user_config, "merging user config");
            figment = merge_file(figment, &user_config);
        }

        if let Some(ref root) = self.project_search_root
            && let Some(project_config) = self.find_project_config(root)
        {
            tracing::debug!(%project_config, "merging project config");
            figment = merge_file(figment, &project_config);
        }

        for file in &self.explicit_files {
            figment = merge_file(figment, file);
        }

        figment
            .extract()
            .map_err(|e| ConfigError::Deserialize(Box::new(e)))
    }

    fn find_project_config(&self, start: &Utf8Path) -> Option<Utf8PathBuf> {
        let mut current = Some(start);

        while let Some(dir) = current {
            for ext in CONFIG_EXTENSIONS {
                let candidates = [
                    dir.join(format!(".{APP_NAME}.{ext}")),
                    dir.join(format!("{APP_NAME}.{ext}")),
                ];
                if let Some(found) = candidates.into_iter().find(|p| p.is_file()) {
                    return Some(found);
                }
            }

            // The boundary directory itself is searched; its parents are not.
            if let Some(ref marker) = self.boundary_marker
                && dir.join(marker).exists()
            {
                break;
            }

            current = dir.parent();
        }

        None
    }
}

fn find_user_config() -> Option<Utf8PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("", "", APP_NAME)?;
    let config_dir = Utf8PathBuf::from_path_buf(proj_dirs.config_dir().to_path_buf()).ok()?;

    CONFIG_EXTENSIONS
        .iter()
        .map(|ext| config_dir.join(format!("config.{ext}")))
        .find(|path| path.is_file())
}

/// Merge a config file into the figment, detecting format from extension.
fn merge_file(figment: Figment, path: &Utf8Path) -> Figment {
    match path.extension() {
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path.as_str())),
        Some("json") => figment.merge(Json::file_exact(path.as_str())),
        _ => figment.merge(Toml::file_exact(path.as_str())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn load_file(tmp: &TempDir, name: &str, contents: &str) -> Config {
        let path = tmp.path().join(name);
        fs::write(&path, contents).unwrap();
        let path = Utf8PathBuf::try_from(path).unwrap();

        ConfigLoader::new()
            .with_user_config(false)
            .with_file(&path)
            .load()
            .unwrap()
    }

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.log_level, LogLevel::Warn);
        assert!(config.log_dir.is_none());
        assert!(config.pyproject.is_none());
        assert!(config.changelog.is_none());
    }

    #[test]
    fn loads_defaults_without_files() {
        let config = ConfigLoader::new()
            .with_user_config(false)
            .without_boundary_marker()
            .load()
            .unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn toml_sections() {
        let tmp = TempDir::new().unwrap();
        let config = load_file(
            &tmp,
            "config.toml",
            r#"
log_level = "debug"

[pyproject]
path = "backend/pyproject.toml"

[changelog]
path = "docs/CHANGELOG.md"
marker = "<!-- next -->"
"#,
        );

        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.pyproject_path(None), "backend/pyproject.toml");
        assert_eq!(
            config.changelog_path(None),
            Utf8PathBuf::from("docs/CHANGELOG.md")
        );
        assert_eq!(config.changelog_marker(None), "<!-- next -->");
    }

    #[test]
    fn yaml_and_json_formats() {
        let tmp = TempDir::new().unwrap();
        let yaml = load_file(&tmp, "config.yaml", "changelog:\n  marker: \"## Next\"\n");
        assert_eq!(yaml.changelog_marker(None), "## Next");

        let json = load_file(&tmp, "config.json", r#"{"log_level": "error"}"#);
        assert_eq!(json.log_level, LogLevel::Error);
    }

    #[test]
    fn flags_beat_config_and_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_file(&tmp, "config.toml", "[changelog]\npath = \"HISTORY.md\"\n");

        assert_eq!(config.changelog_path(Some("NEWS.md".into())), "NEWS.md");
        assert_eq!(config.changelog_path(None), "HISTORY.md");
        assert_eq!(config.changelog_marker(None), DEFAULT_MARKER);
        assert_eq!(config.pyproject_path(None), DEFAULT_PYPROJECT);
    }

    #[test]
    fn later_file_overrides_earlier() {
        let tmp = TempDir::new().unwrap();
        let base = tmp.path().join("base.toml");
        fs::write(&base, r#"log_level = "info""#).unwrap();
        let over = tmp.path().join("override.toml");
        fs::write(&over, r#"log_level = "error""#).unwrap();

        let config = ConfigLoader::new()
            .with_user_config(false)
            .with_file(Utf8PathBuf::try_from(base).unwrap())
            .with_file(Utf8PathBuf::try_from(over).unwrap())
            .load()
            .unwrap();

        assert_eq!(config.log_level, LogLevel::Error);
    }

    #[test]
    fn project_config_discovery_from_subdir() {
        let tmp = TempDir::new().unwrap();
        let project = tmp.path().join("project");
        let sub = project.join("src").join("pkg");
        fs::create_dir_all(&sub).unwrap();
        fs::write(project.join(".cikit.toml"), r#"log_level = "debug""#).unwrap();

        let config = ConfigLoader::new()
            .with_user_config(false)
            .without_boundary_marker()
            .with_project_search(Utf8PathBuf::try_from(sub).unwrap())
            .load()
            .unwrap();

        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn dotfile_beats_regular_name() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".cikit.toml"), r#"log_level = "debug""#).unwrap();
        fs::write(tmp.path().join("cikit.toml"), r#"log_level = "error""#).unwrap();

        let config = ConfigLoader::new()
            .with_user_config(false)
            .with_project_search(Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap())
            .load()
            .unwrap();

        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn boundary_marker_stops_search() {
        let tmp = TempDir::new().unwrap();
        let parent = tmp.path().join("parent");
        let child = parent.join("child");
        let work = child.join("work");
        fs::create_dir_all(&work).unwrap();
        fs::write(parent.join(".cikit.toml"), r#"log_level = "error""#).unwrap();
        fs::create_dir(child.join(".git")).unwrap();

        let config = ConfigLoader::new()
            .with_user_config(false)
            .with_boundary_marker(".git")
            .with_project_search(Utf8PathBuf::try_from(work).unwrap())
            .load()
            .unwrap();

        assert_eq!(config.log_level, LogLevel::Warn);
    }

    #[test]
    fn repo_root_config_found_from_subdir() {
        let tmp = TempDir::new().unwrap();
        let repo = tmp.path().join("repo");
        let backend = repo.join("backend");
        fs::create_dir_all(&backend).unwrap();
        fs::create_dir(repo.join(".git")).unwrap();
        fs::write(
            repo.join(".cikit.toml"),
            "log_level = \"error\"\n[changelog]\npath = \"docs/CHANGELOG.md\"\n",
        )
        .unwrap();

        let config = ConfigLoader::new()
            .with_user_config(false)
            .with_boundary_marker(".git")
            .with_project_search(Utf8PathBuf::try_from(backend).unwrap())
            .load()
            .unwrap();

        assert_eq!(config.log_level, LogLevel::Error);
        assert_eq!(
            config.changelog_path(None),
            Utf8PathBuf::from("docs/CHANGELOG.md")
        );
    }

    #[test]
    fn invalid_value_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.toml");
        fs::write(&path, r#"log_level = "loud""#).unwrap();

        let result = ConfigLoader::new()
            .with_user_config(false)
            .with_file(Utf8PathBuf::try_from(path).unwrap())
            .load();

        assert!(matches!(result, Err(ConfigError::Deserialize(_))));
    }
}
