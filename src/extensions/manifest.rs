//! Source manifest
//!
//! Lists the files staged from the origin directory. Entries are portable
//! relative paths (`/`-separated); anything that could land outside the
//! staging root is rejected when the manifest is built, before any copy.

use super::stager::StageError;
use crate::config::ExtensionConfig;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// A validated manifest entry, stored as its path components
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ManifestPath {
    components: Vec<String>,
}

impl ManifestPath {
    /// Parse a `/`-separated relative path.
    ///
    /// `.` and empty segments are dropped. Absolute paths, drive prefixes,
    /// backslashes and `..` segments are rejected.
    pub fn parse(entry: &str) -> Result<Self, StageError> {
        let invalid = |reason| StageError::InvalidManifestPath {
            entry: entry.to_string(),
            reason,
        };

        if entry.contains('\\') {
            return Err(invalid("backslash separators are not portable, use '/'"));
        }
        if entry.starts_with('/') {
            return Err(invalid("absolute paths are not allowed"));
        }
        if entry.contains(':') {
            return Err(invalid("drive prefixes are not allowed"));
        }

        let mut components = Vec::new();
        for segment in entry.split('/') {
            match segment {
                "" | "." => {}
                ".." => return Err(invalid("parent-directory segments escape the staging root")),
                name => components.push(name.to_string()),
            }
        }

        if components.is_empty() {
            return Err(invalid("path is empty"));
        }

        Ok(Self { components })
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Path relative to whatever root it is joined onto
    #[must_use]
    pub fn to_relative_path(&self) -> PathBuf {
        self.components.iter().collect()
    }

    /// Where this entry lives under `root`.
    /// The mapping preserves directory structure, so distinct entries never collide.
    #[must_use]
    pub fn under(&self, root: &Path) -> PathBuf {
        root.join(self.to_relative_path())
    }
}

impl fmt::Display for ManifestPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.components.join("/"))
    }
}

/// Ordered list of compiled sources and tracked dependencies
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceManifest {
    sources: Vec<ManifestPath>,
    depends: Vec<ManifestPath>,
}

impl SourceManifest {
    /// Build a manifest, rejecting invalid or duplicate entries.
    pub fn new<S: AsRef<str>>(sources: &[S], depends: &[S]) -> Result<Self, StageError> {
        let mut seen = HashSet::new();
        let mut parse_all = |entries: &[S]| -> Result<Vec<ManifestPath>, StageError> {
            entries
                .iter()
                .map(|entry| {
                    let path = ManifestPath::parse(entry.as_ref())?;
                    if !seen.insert(path.clone()) {
                        return Err(StageError::InvalidManifestPath {
                            entry: entry.as_ref().to_string(),
                            reason: "listed more than once",
                        });
                    }
                    Ok(path)
                })
                .collect()
        };

        let sources = parse_all(sources)?;
        let depends = parse_all(depends)?;
        Ok(Self { sources, depends })
    }

    pub fn from_config(config: &ExtensionConfig) -> Result<Self, StageError> {
        Self::new(&config.sources, &config.depends)
    }

    /// Compiled units
    pub fn sources(&self) -> &[ManifestPath] {
        &self.sources
    }

    /// Headers and definition files
    pub fn depends(&self) -> &[ManifestPath] {
        &self.depends
    }

    /// Every entry in staging order: sources, then depends
    pub fn entries(&self) -> impl Iterator<Item = &ManifestPath> {
        self.sources.iter().chain(&self.depends)
    }

    pub fn len(&self) -> usize {
        self.sources.len() + self.depends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
