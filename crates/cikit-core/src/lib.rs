//! Core library for cikit.
//!
//! This crate holds the logic behind the `cikit` CI helpers. Nothing here
//! prints; the CLI crate is a display layer on top.
//!
//! # Modules
//!
//! - [`changelog`] - Release heading insertion and tagged-release link rewriting
//! - [`config`] - Configuration loading and management
//! - [`error`] - Error types and result aliases
//! - [`mypy`] - Decide whether mypy needs an explicit `.` target
//! - [`outputs`] - `key=value` step outputs
//! - [`pyproject`] - `pyproject.toml` loading and lookups
//! - [`quality`] - Quality tool detection from declared dependencies
//!
//! # Quick Start
//!
//! ```no_run
//! use camino::Utf8Path;
//! use cikit_core::{mypy, quality};
//!
//! let manifest = Utf8Path::new("pyproject.toml");
//! let use_dot = mypy::decide_use_dot(manifest).expect("valid pyproject");
//! let scan = quality::detect_tools(manifest).expect("valid pyproject");
//!
//! println!("use_dot={use_dot} ruff={}", scan.tools.ruff);
//! ```
#![deny(unsafe_code)]

pub mod changelog;

pub mod config;

pub mod error;

pub mod mypy;

pub mod outputs;

pub mod pyproject;

pub mod quality;

pub use config::{Config, ConfigLoader, LogLevel};

pub use error::{ConfigError, ConfigResult, OutputError, PyprojectError, PyprojectResult};
