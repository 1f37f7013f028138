//! Changelog release updates.
//!
//! Cutting a release touches a keep-a-changelog style `CHANGELOG.md` in two
//! places:
//!
//! 1. **Tagged releases** ([`update_tagged_releases`]): the link list under
//!    `## Tagged Releases` gets a fresh `unreleased` comparison against the new
//!    tag and an entry for the new version comparing it to the previous one.
//! 2. **Heading** ([`insert_release_heading`]): `## [<version>] - <date>` is
//!    inserted right after the `## [Unreleased]` marker.
//!
//! Both steps are pure text transformations ([`apply_release`]); the file is
//! only rewritten by [`update_changelog`] once both have succeeded, so a
//! failed run leaves it untouched.
//!
//! The link rewrite is best-effort. If the section is missing or its entries
//! don't look like comparison links, the text passes through unchanged and
//! only the heading is inserted.

use std::fmt;
use std::io::Write;
use std::ops::Range;
use std::path::Path;
use std::sync::LazyLock;

use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument};

/// Default changelog file name.
pub const DEFAULT_CHANGELOG: &str = "CHANGELOG.md";

/// Default insertion marker.
pub const DEFAULT_MARKER: &str = "## [Unreleased]";

/// Label of the placeholder entry that always compares against `HEAD`.
const UNRELEASED: &str = "unreleased";

/// Tag prefix used when none can be inferred from existing links.
const DEFAULT_TAG_PREFIX: &str = "v";

/// URL path segments that separate the repository URL from the tag part.
const URL_MARKERS: [&str; 2] = ["/compare/", "/releases/tag/"];

static SECTION_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^## Tagged Releases\s*\n").expect("valid regex"));

static NEXT_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^## ").expect("valid regex"));

static ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^- \[([^\]]+)\]\(([^)]+)\)").expect("valid regex"));

static COMPARE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/compare/([^/]+?)\.\.\.([^/)]+)").expect("valid regex"));

// ──────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────

/// Errors from changelog updates.
#[derive(Error, Debug)]
pub enum ChangelogError {
    /// The changelog file does not exist.
    #[error("{0} not found")]
    NotFound(Utf8PathBuf),

    /// The changelog could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Changelog path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The release heading is already present.
    #[error("{heading} already exists")]
    DuplicateHeading {
        /// The heading that was found.
        heading: String,
    },

    /// The insertion marker is missing.
    #[error("marker '{marker}' not found")]
    MarkerNotFound {
        /// The marker that was searched for.
        marker: String,
    },

    /// The updated changelog could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        /// Changelog path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Result alias for changelog operations.
pub type ChangelogResult<T> = Result<T, ChangelogError>;

// ──────────────────────────────────────────────
// Tagged releases
// ──────────────────────────────────────────────

/// One `- [label](url)` line of the tagged releases list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseEntry {
    /// Version label, or `unreleased`.
    pub label: String,
    /// Comparison or release URL.
    pub url: String,
}

impl ReleaseEntry {
    fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }

    /// Parse a list line. Leading and trailing whitespace is ignored, and
    /// anything after the closing parenthesis is dropped.
    pub fn parse(line: &str) -> Option<Self> {
        let caps = ENTRY.captures(line.trim())?;
        Some(Self::new(&caps[1], &caps[2]))
    }

    fn is_unreleased(&self) -> bool {
        self.label.eq_ignore_ascii_case(UNRELEASED)
    }
}

impl fmt::Display for ReleaseEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "- [{}]({})", self.label, self.url)
    }
}

/// Rewrite the `## Tagged Releases` links for `version`.
///
/// Returns the text unchanged when the section is missing or can't be
/// interpreted.
pub fn update_tagged_releases(text: &str, version: &str) -> String {
    rewrite_tagged_releases(text, version).unwrap_or_else(|| text.to_owned())
}

/// Like [`update_tagged_releases`], but `None` means "nothing to rewrite".
#[instrument(skip(text))]
pub fn rewrite_tagged_releases(text: &str, version: &str) -> Option<String> {
    let Some(body) = find_section_body(text) else {
        debug!("no tagged releases section");
        return None;
    };

    let entries: Vec<ReleaseEntry> = text[body.clone()]
        .lines()
        .filter_map(ReleaseEntry::parse)
        .collect();

    // Need the unreleased placeholder plus at least one real release.
    if entries.len() < 2 {
        debug!(count = entries.len(), "too few tagged release entries");
        return None;
    }

    let Some(base) = base_url(&entries) else {
        debug!("no comparison or release URL to derive base from");
        return None;
    };
    let prefix = tag_prefix(&entries);

    let Some(previous) = entries.iter().find(|e| !e.is_unreleased()) else {
        debug!("no previous release entry");
        return None;
    };

    debug!(base, prefix, previous = %previous.label, "rewriting tagged releases");

    let mut rewritten = vec![
        ReleaseEntry::new(
            UNRELEASED,
            format!("{base}/compare/{prefix}{version}...HEAD"),
        ),
        ReleaseEntry::new(
            version,
            format!(
                "{base}/compare/{prefix}{previous}...{prefix}{version}",
                previous = previous.label
            ),
        ),
    ];
    rewritten.extend(entries.iter().filter(|e| !e.is_unreleased()).cloned());

    let mut new_body = String::from("\n");
    for entry in &rewritten {
        new_body.push_str(&entry.to_string());
        new_body.push('\n');
    }
    new_body.push('\n');

    Some(format!(
        "{}{new_body}{}",
        &text[..body.start],
        &text[body.end..]
    ))
}

/// Byte range of the tagged releases body.
///
/// The body starts after the heading line and any blank lines that follow
/// it, and runs to the next `## ` heading or end of text.
fn find_section_body(text: &str) -> Option<Range<usize>> {
    let heading = SECTION_HEADING.find(text)?;
    let start = heading.end();
    let end = NEXT_HEADING
        .find_at(text, start)
        .map_or(text.len(), |m| m.start());
    Some(start..end)
}

/// Repository URL shared by the entries: everything before `/compare/` or
/// `/releases/tag/` in the first URL that has a non-empty one.
fn base_url(entries: &[ReleaseEntry]) -> Option<&str> {
    entries.iter().find_map(|entry| {
        URL_MARKERS
            .iter()
            .find_map(|marker| entry.url.find(marker))
            .map(|idx| &entry.url[..idx])
            .filter(|base| !base.is_empty())
    })
}

/// Infer the tag prefix (`v` in `v1.2.0`) from comparison URLs.
///
/// `HEAD` and digit-free tags are ignored. Scanning continues past entries
/// that yield the default prefix, so a later `release-` tag still wins.
fn tag_prefix(entries: &[ReleaseEntry]) -> &str {
    let mut prefix = DEFAULT_TAG_PREFIX;
    for entry in entries {
        let Some(caps) = COMPARE.captures(&entry.url) else {
            continue;
        };

        let found = [caps.get(1), caps.get(2)]
            .into_iter()
            .flatten()
            .map(|tag| tag.as_str())
            .filter(|tag| !tag.eq_ignore_ascii_case("HEAD"))
            .find_map(|tag| {
                let idx = tag.find(|c: char| c.is_ascii_digit())?;
                Some(&tag[..idx])
            });

        if let Some(found) = found {
            prefix = found;
        }
        if prefix != DEFAULT_TAG_PREFIX {
            break;
        }
    }
    prefix
}

// ──────────────────────────────────────────────
// Heading
// ──────────────────────────────────────────────

/// `## [<version>] - <date>`
pub fn render_heading(version: &str, date: &str) -> String {
    format!("## [{version}] - {date}")
}

/// Insert `heading` after the first occurrence of `marker`.
///
/// Fails if the heading is already present anywhere or the marker is
/// missing. Blank-line runs are collapsed afterwards.
pub fn insert_release_heading(
    text: &str,
    heading: &str,
    marker: &str,
) -> ChangelogResult<String> {
    if text.contains(heading) {
        return Err(ChangelogError::DuplicateHeading {
            heading: heading.to_owned(),
        });
    }

    let idx = text
        .find(marker)
        .map(|idx| idx + marker.len())
        .ok_or_else(|| ChangelogError::MarkerNotFound {
            marker: marker.to_owned(),
        })?;

    let inserted = format!("{}\n\n{heading}\n\n{}", &text[..idx], &text[idx..]);
    Ok(normalize_blank_lines(&inserted))
}

/// Collapse every run of whitespace-only lines into its first line.
pub fn normalize_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_blank = false;
    for line in text.split_inclusive('\n') {
        let blank = line.trim().is_empty();
        if !(blank && previous_blank) {
            out.push_str(line);
        }
        previous_blank = blank;
    }
    out
}

// ──────────────────────────────────────────────
// Pipeline
// ──────────────────────────────────────────────

/// Changelog text after both transformations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedRelease {
    /// The updated document.
    pub text: String,
    /// The inserted heading line.
    pub heading: String,
    /// Whether the tagged releases list was rewritten.
    pub links_rewritten: bool,
}

/// Run the link rewrite, then the heading insertion, on `text`.
pub fn apply_release(
    text: &str,
    version: &str,
    date: &str,
    marker: &str,
) -> ChangelogResult<AppliedRelease> {
    let rewritten = rewrite_tagged_releases(text, version);
    let links_rewritten = rewritten.is_some();
    let text = rewritten.as_deref().unwrap_or(text);

    let heading = render_heading(version, date);
    let text = insert_release_heading(text, &heading, marker)?;

    Ok(AppliedRelease {
        text,
        heading,
        links_rewritten,
    })
}

/// A requested changelog update.
#[derive(Debug, Clone)]
pub struct ChangelogUpdate {
    /// Changelog file.
    pub path: Utf8PathBuf,
    /// New release version (e.g. `0.2.0`).
    pub version: String,
    /// Release date, free-form.
    pub date: String,
    /// Line the heading is inserted after.
    pub marker: String,
    /// Compute the result without writing it.
    pub dry_run: bool,
}

/// Result of a successful update.
#[derive(Debug, Clone, Serialize)]
pub struct ChangelogOutcome {
    /// Changelog file.
    pub path: Utf8PathBuf,
    /// Released version.
    pub version: String,
    /// Inserted heading.
    pub heading: String,
    /// Whether the tagged releases list was rewritten.
    pub links_rewritten: bool,
    /// Whether the file was written (`false` for dry runs).
    pub written: bool,
    /// Updated document, kept only for dry runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Read, transform, and rewrite a changelog.
#[instrument(skip_all, fields(path = %update.path, version = %update.version))]
pub fn update_changelog(update: &ChangelogUpdate) -> ChangelogResult<ChangelogOutcome> {
    let path = &update.path;
    if !path.exists() {
        return Err(ChangelogError::NotFound(path.clone()));
    }

    let text = std::fs::read_to_string(path).map_err(|source| ChangelogError::Read {
        path: path.clone(),
        source,
    })?;

    let applied = apply_release(&text, &update.version, &update.date, &update.marker)?;

    let content = if update.dry_run {
        debug!("dry run, not writing");
        Some(applied.text)
    } else {
        write_atomic(path, &applied.text).map_err(|source| ChangelogError::Write {
            path: path.clone(),
            source,
        })?;
        info!(
            heading = %applied.heading,
            links_rewritten = applied.links_rewritten,
            "changelog updated"
        );
        None
    };

    Ok(ChangelogOutcome {
        path: path.clone(),
        version: update.version.clone(),
        heading: applied.heading,
        links_rewritten: applied.links_rewritten,
        written: !update.dry_run,
        content,
    })
}

/// Replace `path` with `contents` via a temp file next to the real file,
/// keeping the original permissions.
///
/// Symlinks are resolved first so the link target is updated and the link
/// itself survives.
fn write_atomic(path: &Utf8Path, contents: &str) -> std::io::Result<()> {
    let target = std::fs::canonicalize(path)?;
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    let permissions = std::fs::metadata(&target)?.permissions();

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.as_file().set_permissions(permissions)?;
    tmp.persist(&target).map_err(|e| e.error)?;
    Ok(())
}
