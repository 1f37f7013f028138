//! Observability setup: structured logging.
//!
//! stdout carries command results (and is often captured by CI), so logs
//! never go there. By default they are human-readable lines on stderr; when a
//! log file or directory is configured they are written there as JSONL.

use anyhow::Result;
use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const ENV_LOG_PATH: &str = "CIKIT_LOG_PATH";
const ENV_LOG_DIR: &str = "CIKIT_LOG_DIR";
const LOG_FILE_SUFFIX: &str = ".jsonl";

/// Configuration for observability setup.
#[derive(Clone, Debug)]
pub struct ObservabilityConfig {
    /// The service name, used for the default log file name.
    pub service: String,
    /// Directory for JSONL log files from the config file.
    pub log_dir: Option<PathBuf>,
}

impl ObservabilityConfig {
    /// Create config from environment variables with optional overrides.
    pub fn from_env_with_overrides(log_dir: Option<PathBuf>) -> Self {
        Self {
            service: env!("CARGO_PKG_NAME").to_string(),
            log_dir,
        }
    }
}

#[derive(Clone, Debug)]
struct LogTarget {
    dir: PathBuf,
    file_name: String,
}

impl LogTarget {
    #[cfg(test)]
    fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

/// Guard that must be held for the lifetime of the application so buffered
/// log lines are flushed on exit.
pub struct ObservabilityGuard {
    _log_guard: tracing_appender::non_blocking::WorkerGuard,
}

/// Initialize logging.
///
/// Returns a guard that must be held for the application lifetime.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_observability(
    cfg: &ObservabilityConfig,
    env_filter: EnvFilter,
) -> Result<ObservabilityGuard> {
    let target = match resolve_log_target(&cfg.service, cfg.log_dir.as_deref()) {
        Ok(target) => target,
        Err(err) => {
            eprintln!("Warning: {err}. Falling back to stderr logging.");
            None
        }
    };

    let guard = match target {
        Some(target) => {
            let appender = tracing_appender::rolling::never(&target.dir, &target.file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(false)
                .with_writer(writer);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(layer)
                .try_init()?;
            guard
        }
        None => {
            let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
            let layer = fmt::layer()
                .compact()
                .without_time()
                .with_target(false)
                .with_ansi(std::io::stderr().is_terminal())
                .with_writer(writer);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(layer)
                .try_init()?;
            guard
        }
    };

    tracing::debug!("observability initialized");

    Ok(ObservabilityGuard { _log_guard: guard })
}

/// Build an `EnvFilter` based on CLI flags and environment.
///
/// Priority: quiet flag > verbose flag > RUST_LOG env > default_level
pub fn env_filter(quiet: bool, verbose: u8, default_level: &str) -> EnvFilter {
    if quiet {
        return EnvFilter::new("error");
    }

    if verbose > 0 {
        let level = match verbose {
            1 => "debug",
            _ => "trace",
        };
        return EnvFilter::new(level);
    }

    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

// ============================================================================
// Log Target Resolution
// ============================================================================

fn resolve_log_target(
    service: &str,
    config_log_dir: Option<&Path>,
) -> Result<Option<LogTarget>, String> {
    let path_override = std::env::var_os(ENV_LOG_PATH)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from);
    let dir_override = std::env::var_os(ENV_LOG_DIR)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from);

    resolve_log_target_with(
        service,
        path_override,
        dir_override,
        config_log_dir.map(PathBuf::from),
    )
}

/// `None` means log to stderr.
fn resolve_log_target_with(
    service: &str,
    path_override: Option<PathBuf>,
    dir_override: Option<PathBuf>,
    config_dir: Option<PathBuf>,
) -> Result<Option<LogTarget>, String> {
    if let Some(path) = path_override {
        return log_target_from_path(path).map(Some);
    }

    match dir_override.or(config_dir) {
        Some(dir) => log_target_from_dir(dir, service).map(Some),
        None => Ok(None),
    }
}

fn log_target_from_dir(dir: PathBuf, service: &str) -> Result<LogTarget, String> {
    let file_name = format!("{service}{LOG_FILE_SUFFIX}");
    ensure_writable(&dir, &file_name)?;
    Ok(LogTarget { dir, file_name })
}

fn log_target_from_path(path: PathBuf) -> Result<LogTarget, String> {
    let file_name = path
        .file_name()
        .ok_or_else(|| format!("{ENV_LOG_PATH} must include a file name"))
        .and_then(|name| {
            name.to_str()
                .map(|value| value.to_string())
                .ok_or_else(|| format!("{ENV_LOG_PATH} must be valid UTF-8"))
        })?;

    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    ensure_writable(dir, &file_name)?;

    Ok(LogTarget {
        dir: dir.to_path_buf(),
        file_name,
    })
}

fn ensure_writable(dir: &Path, file_name: &str) -> Result<(), String> {
    std::fs::create_dir_all(dir)
        .map_err(|e| format!("Failed to create log directory {}: {e}", dir.display()))?;

    let path = dir.join(file_name);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| format!("Failed to open log file {}: {e}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn env_filter_quiet_overrides() {
        let filter = env_filter(true, 3, "info");
        assert_eq!(filter.to_string(), "error");
    }

    #[test]
    fn env_filter_verbose_maps_to_debug_and_trace() {
        assert_eq!(env_filter(false, 1, "warn").to_string(), "debug");
        assert_eq!(env_filter(false, 2, "warn").to_string(), "trace");
    }

    #[test]
    fn no_overrides_means_stderr() {
        let target = resolve_log_target_with("demo", None, None, None).unwrap();
        assert!(target.is_none());
    }

    #[test]
    fn path_override_wins() {
        let tmp = TempDir::new().unwrap();
        let file_path = tmp.path().join("nested").join("override.jsonl");

        let target = resolve_log_target_with(
            "demo",
            Some(file_path.clone()),
            Some(tmp.path().join("ignored")),
            None,
        )
        .unwrap()
        .unwrap();

        assert_eq!(target.path(), file_path);
        assert!(file_path.exists());
    }

    #[test]
    fn env_dir_beats_config_dir() {
        let tmp = TempDir::new().unwrap();
        let env_dir = tmp.path().join("env");
        let config_dir = tmp.path().join("config");

        let target = resolve_log_target_with("demo", None, Some(env_dir.clone()), Some(config_dir))
            .unwrap()
            .unwrap();

        assert_eq!(target.dir, env_dir);
        assert_eq!(target.file_name, format!("demo{LOG_FILE_SUFFIX}"));
    }

    #[test]
    fn config_dir_used_when_no_env() {
        let tmp = TempDir::new().unwrap();
        let target = resolve_log_target_with("demo", None, None, Some(tmp.path().to_path_buf()))
            .unwrap()
            .unwrap();
        assert_eq!(target.path(), tmp.path().join("demo.jsonl"));
    }

    #[test]
    fn path_without_file_name_is_rejected() {
        let err = log_target_from_path(PathBuf::from("/")).unwrap_err();
        assert!(err.contains("must include a file name"));
    }
}
