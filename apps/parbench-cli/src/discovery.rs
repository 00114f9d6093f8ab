//! Result file discovery
//!
//! Result files live flat in one directory. Their names encode the problem
//! size and configuration; a regular expression with named groups extracts
//! them.

use anyhow::{bail, Context, Result};
use regex::{Captures, Regex};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use parbench_core::{ConfigurationKey, ProblemSize};

/// One result file and the pair it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultFile {
    /// Full path
    pub path: PathBuf,
    /// File name, used in error messages
    pub name: String,
    /// Problem size from the name
    pub size: ProblemSize,
    /// Configuration from the name
    pub configuration: ConfigurationKey,
}

/// Maps file names to (problem size, configuration)
#[derive(Debug, Clone)]
pub struct FileMatcher {
    regex: Regex,
    batch: String,
}

impl FileMatcher {
    /// Compile `pattern` for the batch named `batch`.
    ///
    /// The pattern must define the named groups `size` and `runtime`. The
    /// optional groups `threads`, `schedule` and `chunk` fill the matching
    /// configuration fields; an optional `batch` group must equal `batch` for a
    /// file to be selected.
    pub fn new(pattern: &str, batch: &str) -> Result<Self> {
        let regex = Regex::new(pattern)
            .with_context(|| format!("Invalid discovery pattern: {pattern}"))?;
        for required in ["size", "runtime"] {
            if !regex.capture_names().flatten().any(|name| name == required) {
                bail!("Discovery pattern must define a named group '{required}': {pattern}");
            }
        }
        Ok(Self {
            regex,
            batch: batch.to_string(),
        })
    }

    /// Classify a file name; `Ok(None)` if it is not part of the batch.
    pub fn classify(&self, file_name: &str) -> Result<Option<(ProblemSize, ConfigurationKey)>> {
        let Some(captures) = self.regex.captures(file_name) else {
            return Ok(None);
        };
        if let Some(batch) = captures.name("batch") {
            if batch.as_str() != self.batch {
                return Ok(None);
            }
        }

        let group = |name: &str| captures.name(name).map(|m| m.as_str());
        let size = ProblemSize::parse(group("size").unwrap_or_default())
            .with_context(|| format!("Invalid problem size in file name: {file_name}"))?;

        let mut configuration = ConfigurationKey::runtime(group("runtime").unwrap_or_default());
        if let Some(threads) = number(&captures, "threads", file_name)? {
            configuration = configuration.with_threads(threads);
        }
        if let Some(schedule) = group("schedule") {
            configuration = configuration.with_schedule(schedule);
        }
        if let Some(chunk) = number(&captures, "chunk", file_name)? {
            configuration = configuration.with_chunk(chunk);
        }
        Ok(Some((size, configuration)))
    }
}

fn number(captures: &Captures<'_>, name: &str, file_name: &str) -> Result<Option<u32>> {
    captures
        .name(name)
        .map(|m| {
            m.as_str()
                .parse::<u32>()
                .with_context(|| format!("Invalid {name} '{}' in file name: {file_name}", m.as_str()))
        })
        .transpose()
}

/// List the batch's result files in `dir`, sorted by file name.
///
/// Discovery is not recursive. Files that do not match are skipped; an
/// empty result is an error.
pub fn discover(dir: &Path, matcher: &FileMatcher) -> Result<Vec<ResultFile>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read input directory: {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry =
            entry.with_context(|| format!("Failed to read entry in: {}", dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            continue;
        };
        match matcher.classify(&name)? {
            Some((size, configuration)) => files.push(ResultFile {
                path,
                name,
                size,
                configuration,
            }),
            None => debug!("skipping {name}"),
        }
    }

    if files.is_empty() {
        bail!(
            "No result files for batch '{}' in {}",
            matcher.batch,
            dir.display()
        );
    }
    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}
