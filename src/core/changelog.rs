// src/core/changelog.rs

use crate::constants::{DEFAULT_GITHUB_OUTPUT_VAR, DEFAULT_SECTION_HEADER};
use lazy_static::lazy_static;
use regex::Regex;
use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

lazy_static! {
    // A second-level header, but not `###` and deeper.
    static ref RELEASE_HEADER_RE: Regex = Regex::new(r"^##([^#])").expect("valid header regex");
    static ref HEADER_VERSION_RE: Regex =
        Regex::new(r"^##\s+\[?v?([0-9]+\.[0-9]+\.[0-9]+[^\s\]]*)").expect("valid version regex");
}

/// Failures while reading a changelog or writing its output.
#[derive(Error, Debug)]
pub enum ChangelogError {
    /// The changelog file is missing.
    #[error("Changelog file '{path}' does not exist")]
    NotFound {
        /// Path that was looked up.
        path: String,
    },
    /// The changelog could not be read.
    #[error("Error reading changelog '{path}': {source}")]
    Io {
        /// The changelog path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// A header pattern does not compile.
    #[error("Invalid header regex '{pattern}': {source}")]
    InvalidRegex {
        /// The pattern as given.
        pattern: String,
        /// Compilation error.
        #[source]
        source: regex::Error,
    },
    /// The GitHub Actions output file could not be written.
    #[error("Failed to write GitHub output file '{path}': {source}")]
    OutputTarget {
        /// The output file path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// The header patterns delimiting a changelog section.
///
/// The section starts *after* the first line matching `start` and stops *before* the
/// next line matching `end`.
#[derive(Debug, Clone)]
pub struct SectionBounds {
    start: Regex,
    end: Regex,
}

impl SectionBounds {
    /// Compiles explicit start and end header patterns.
    pub fn new(start: &str, end: &str) -> Result<Self, ChangelogError> {
        Ok(Self {
            start: compile(start)?,
            end: compile(end)?,
        })
    }

    /// Bounds for `extract-section`: the section of `version` (or the first one),
    /// unless an explicit start pattern is given. An unanchored default end pattern
    /// is anchored.
    pub fn for_version(
        version: Option<&str>,
        start_override: Option<&str>,
        end: &str,
    ) -> Result<Self, ChangelogError> {
        let start = match (start_override.filter(|s| !s.is_empty()), version.filter(|v| !v.is_empty())) {
            (Some(start), _) => start.to_string(),
            (None, Some(version)) => format!("^## .*{}.*", regex::escape(version)),
            (None, None) => DEFAULT_SECTION_HEADER.to_string(),
        };
        let end = if end == "## .+" { DEFAULT_SECTION_HEADER } else { end };
        Self::new(&start, end)
    }

    /// Bounds of the latest release section: any `## ` header opens and closes it.
    pub fn latest_release() -> Self {
        Self {
            start: RELEASE_HEADER_RE.clone(),
            end: RELEASE_HEADER_RE.clone(),
        }
    }
}

fn compile(pattern: &str) -> Result<Regex, ChangelogError> {
    Regex::new(pattern).map_err(|source| ChangelogError::InvalidRegex {
        pattern: pattern.to_string(),
        source,
    })
}

/// Extracts the lines between the start header and the end header.
///
/// Returns `None` when no line matches the start pattern. The section text has its
/// leading and trailing blank lines removed.
pub fn extract_section<R: BufRead>(reader: R, bounds: &SectionBounds) -> io::Result<Option<String>> {
    let mut found_header = false;
    let mut lines = Vec::new();

    for line in lossy_lines(reader) {
        let line = line?;
        if !found_header {
            found_header = bounds.start.is_match(&line);
            continue;
        }
        if bounds.end.is_match(&line) {
            break;
        }
        lines.push(line);
    }

    if !found_header {
        return Ok(None);
    }
    log::trace!("Computed changelog lines: {:?}", lines);
    Ok(Some(trim_blank_lines(&lines.join("\n")).to_string()))
}

/// Lines of `reader` without their `\n` / `\r\n` ending. Invalid UTF-8 is replaced
/// rather than failing the whole read.
fn lossy_lines<R: BufRead>(mut reader: R) -> impl Iterator<Item = io::Result<String>> {
    let mut buffer = Vec::new();
    std::iter::from_fn(move || {
        buffer.clear();
        match reader.read_until(b'\n', &mut buffer) {
            Ok(0) => None,
            Ok(_) => {
                let line = buffer.strip_suffix(b"\n").unwrap_or(buffer.as_slice());
                let line = line.strip_suffix(b"\r").unwrap_or(line);
                Some(Ok(String::from_utf8_lossy(line).into_owned()))
            }
            Err(e) => Some(Err(e)),
        }
    })
}

/// Same as [`extract_section`] on a file. A missing file is an error.
pub fn extract_section_from_file(
    path: &Path,
    bounds: &SectionBounds,
) -> Result<Option<String>, ChangelogError> {
    let display = path.display().to_string();
    if !path.is_file() {
        return Err(ChangelogError::NotFound { path: display });
    }
    let file = fs::File::open(path).map_err(|source| ChangelogError::Io {
        path: display.clone(),
        source,
    })?;
    extract_section(BufReader::new(file), bounds)
        .map_err(|source| ChangelogError::Io { path: display, source })
}

/// Release notes for the latest release: the first `## ` section of the changelog.
/// A missing changelog yields empty notes.
pub fn read_release_notes(path: &Path) -> Result<String, ChangelogError> {
    if !path.is_file() {
        log::debug!("No changelog at '{}', release notes are empty.", path.display());
        return Ok(String::new());
    }
    Ok(extract_section_from_file(path, &SectionBounds::latest_release())?.unwrap_or_default())
}

/// The version named by a `## ` header, normalized with a `v` prefix.
///
/// `## v1.0.0`, `## [1.0.0] - 2024-01-01` and `## 1.0.0-rc.1` all name a version;
/// `## Unreleased` does not.
pub fn extract_version_from_header(header: &str) -> Option<String> {
    HEADER_VERSION_RE
        .captures(header)
        .and_then(|caps| caps.get(1))
        .map(|version| format!("v{}", version.as_str()))
}

/// The version of the latest released section, looking only at the first `## `
/// header. A leading `## Unreleased` section therefore yields `None`.
pub fn read_version(path: &Path) -> Result<Option<String>, ChangelogError> {
    if !path.is_file() {
        return Ok(None);
    }
    let display = path.display().to_string();
    let file = fs::File::open(path).map_err(|source| ChangelogError::Io {
        path: display.clone(),
        source,
    })?;
    for line in lossy_lines(BufReader::new(file)) {
        let line = line.map_err(|source| ChangelogError::Io {
            path: display.clone(),
            source,
        })?;
        if RELEASE_HEADER_RE.is_match(&line) {
            return Ok(extract_version_from_header(&line));
        }
    }
    Ok(None)
}

/// Removes leading and trailing whitespace, blank lines included.
pub fn trim_blank_lines(input: &str) -> &str {
    input.trim()
}

/// Where to write a GitHub Actions output: `variable:path` or just `path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubOutputTarget {
    /// Output variable name.
    pub variable: String,
    /// File the heredoc is appended to.
    pub path: PathBuf,
}

impl GitHubOutputTarget {
    /// Splits on the first `:`; without one the variable is `changelog`.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((variable, path)) => Self {
                variable: variable.to_string(),
                path: PathBuf::from(path),
            },
            None => Self {
                variable: DEFAULT_GITHUB_OUTPUT_VAR.to_string(),
                path: PathBuf::from(raw),
            },
        }
    }
}

/// Appends `variable<<DELIM\ncontent\nDELIM\n` to the GitHub Actions output file.
/// The delimiter is random so the content cannot terminate the block early.
pub fn write_github_output(target: &GitHubOutputTarget, content: &str) -> Result<(), ChangelogError> {
    let delimiter = format!("ghadelimiter_{}", Uuid::new_v4());
    let to_error = |source| ChangelogError::OutputTarget {
        path: target.path.display().to_string(),
        source,
    };

    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(&target.path)
        .map_err(to_error)?;
    write!(
        file,
        "{}<<{}\n{}\n{}\n",
        target.variable, delimiter, content, delimiter
    )
    .map_err(to_error)
}
