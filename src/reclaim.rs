//! Artifact reclaiming
//!
//! Computes the set of build artifacts under a project root and deletes it.
//! The set is recomputed on every run and never persisted, so a second run
//! over a clean tree finds nothing.
//!
//! Every candidate is checked lexically against the project root before it is
//! touched. Symlinks are deleted as links; their targets are never visited,
//! and nothing reached through a symlinked directory is collected.

use crate::config::Config;
use crate::fs::{EntryKind, FileSystem};
use crate::paths::{glob_match, is_strictly_within, normalize_lexically};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory the packaging convention writes its intermediate trees into
const BUILD_DIR: &str = "build";

const THROUGH_SYMLINK: &str = "reached through a symlinked directory";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReclaimError {
    #[error("Failed to remove {failed} path(s)")]
    Incomplete { failed: usize },
}

/// What to look for when collecting artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReclaimRules {
    /// Paths relative to the project root, removed if present
    pub fixed_paths: Vec<String>,
    /// Directory holding the compiled extension
    pub package_dir: String,
    /// File-name pattern of compiled extension artifacts in `package_dir`
    pub artifact_pattern: String,
    pub cache_dir_names: Vec<String>,
    pub cache_file_extensions: Vec<String>,
}

impl ReclaimRules {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let mut fixed_paths = config.clean.output_dirs.clone();
        fixed_paths.extend(config.clean.extra_paths.iter().cloned());
        fixed_paths.push(config.extension.staging_dir.clone());
        fixed_paths.push(config.metadata_dir_name());

        Self {
            fixed_paths,
            package_dir: config.extension.package_dir.clone(),
            artifact_pattern: format!("{}.*", config.extension.module_name),
            cache_dir_names: config.clean.cache_dir_names.clone(),
            cache_file_extensions: config.clean.cache_file_extensions.clone(),
        }
    }

    fn is_cache_dir(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| self.cache_dir_names.iter().any(|n| n == name))
    }

    fn is_cache_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.cache_file_extensions.iter().any(|e| e == ext))
    }
}

/// A path that could not be removed, and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReclaimFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Ordered, ancestor-free set of paths to delete
///
/// A path is not added when one of its ancestors is already in the set, and
/// adding an ancestor evicts its descendants, so no removal ever targets a
/// path that an earlier removal already took away.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactSet {
    paths: Vec<PathBuf>,
    rejected: Vec<ReclaimFailure>,
}

impl ArtifactSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `path` unless it is already covered. Returns true if it was added.
    pub fn insert(&mut self, path: PathBuf) -> bool {
        if self.paths.iter().any(|existing| path.starts_with(existing)) {
            return false;
        }
        self.paths.retain(|existing| !existing.starts_with(&path));
        self.paths.push(path);
        true
    }

    /// Record a candidate that must not be touched
    pub fn reject(&mut self, path: PathBuf, reason: impl Into<String>) {
        self.rejected.push(ReclaimFailure {
            path,
            reason: reason.into(),
        });
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn rejected(&self) -> &[ReclaimFailure] {
        &self.rejected
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && self.rejected.is_empty()
    }

    /// Add `path` if it exists, lies inside `root` and no directory between
    /// the two is a symlink.
    fn consider(&mut self, fs: &impl FileSystem, root: &Path, path: PathBuf) {
        if !is_strictly_within(root, &path) {
            crate::debug!("refusing to reclaim {}", path.display());
            self.reject(path, "outside the project root");
            return;
        }
        if fs.entry_kind(&path).is_none() {
            return;
        }
        if let Some(link) = symlinked_ancestor(fs, root, &path) {
            crate::debug!("refusing to reclaim {} via {}", path.display(), link.display());
            self.reject(path, THROUGH_SYMLINK);
            return;
        }
        self.insert(path);
    }
}

/// First directory strictly between `root` and `path` that is a symlink
fn symlinked_ancestor(fs: &impl FileSystem, root: &Path, path: &Path) -> Option<PathBuf> {
    let normalized = normalize_lexically(path);
    let relative = normalized.strip_prefix(normalize_lexically(root)).ok()?;

    let mut current = root.to_path_buf();
    for component in relative.parent()?.components() {
        current.push(component);
        if fs.entry_kind(&current) == Some(EntryKind::Symlink) {
            return Some(current);
        }
    }
    None
}

/// True if `dir` is a real directory reached without crossing a symlink
fn is_real_dir(fs: &impl FileSystem, root: &Path, dir: &Path) -> bool {
    fs.entry_kind(dir) == Some(EntryKind::Dir) && symlinked_ancestor(fs, root, dir).is_none()
}

/// Collect every existing artifact under `root`.
///
/// 1. fixed paths (output dirs, extra paths, staging dir, metadata dir)
/// 2. compiled extension files in the package directory
/// 3. bytecode caches anywhere below the root
pub fn collect_artifacts(fs: &impl FileSystem, root: &Path, rules: &ReclaimRules) -> ArtifactSet {
    let mut set = ArtifactSet::new();

    for fixed in &rules.fixed_paths {
        set.consider(fs, root, root.join(fixed));
    }

    collect_package_artifacts(fs, root, rules, &mut set);

    for entry in fs.walk(root) {
        let wanted = match entry.kind {
            EntryKind::Dir => rules.is_cache_dir(&entry.path),
            EntryKind::File => rules.is_cache_file(&entry.path),
            EntryKind::Symlink => {
                rules.is_cache_dir(&entry.path) || rules.is_cache_file(&entry.path)
            }
        };
        if wanted {
            set.consider(fs, root, entry.path);
        }
    }

    set
}

/// Compiled extension files directly inside the package directory.
///
/// A package directory that is itself a symlink, or sits below one, is
/// rejected rather than listed.
fn collect_package_artifacts(
    fs: &impl FileSystem,
    root: &Path,
    rules: &ReclaimRules,
    set: &mut ArtifactSet,
) {
    let package_dir = root.join(&rules.package_dir);
    if !is_strictly_within(root, &package_dir) {
        crate::debug!("skipping package dir {} outside the root", package_dir.display());
        return;
    }
    if fs.entry_kind(&package_dir) == Some(EntryKind::Symlink)
        || symlinked_ancestor(fs, root, &package_dir).is_some()
    {
        crate::debug!("refusing to list package dir {}", package_dir.display());
        set.reject(package_dir, THROUGH_SYMLINK);
        return;
    }

    let entries = match fs.read_dir(&package_dir) {
        Ok(entries) => entries,
        Err(err) => {
            crate::debug!("skipping package dir {}: {err}", package_dir.display());
            return;
        }
    };
    for entry in entries {
        let matches = entry
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| glob_match(&rules.artifact_pattern, name));
        if matches && entry.kind != EntryKind::Dir {
            set.consider(fs, root, entry.path);
        }
    }
}

/// Intermediate trees the packaging convention leaves under `build/`.
///
/// `temp.*` always; with `all` also `lib.*`, `bdist.*` and `scripts-*`.
/// A `build/` that is not a real directory is left for the fixed-path pass,
/// which removes it as a single entry.
pub fn conventional_artifacts(fs: &impl FileSystem, root: &Path, all: bool) -> ArtifactSet {
    let mut patterns = vec!["temp.*"];
    if all {
        patterns.extend(["lib.*", "bdist.*", "scripts-*"]);
    }

    let mut set = ArtifactSet::new();
    let build_dir = root.join(BUILD_DIR);
    if !is_real_dir(fs, root, &build_dir) {
        return set;
    }
    let Ok(entries) = fs.read_dir(&build_dir) else {
        return set;
    };

    for entry in entries {
        let Some(name) = entry.path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if patterns.iter().any(|pattern| glob_match(pattern, name)) {
            set.consider(fs, root, entry.path);
        }
    }

    set
}

/// Outcome of a reclaim pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReclaimReport {
    pub removed: Vec<PathBuf>,
    /// Already gone when the pass reached them
    pub missing: Vec<PathBuf>,
    pub failed: Vec<ReclaimFailure>,
}

impl ReclaimReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Fold another pass into this report
    pub fn merge(&mut self, other: Self) {
        self.removed.extend(other.removed);
        self.missing.extend(other.missing);
        self.failed.extend(other.failed);
    }

    /// # Errors
    ///
    /// Returns `Incomplete` if any path could not be removed.
    pub fn into_result(self) -> Result<Self, ReclaimError> {
        if self.is_complete() {
            Ok(self)
        } else {
            Err(ReclaimError::Incomplete {
                failed: self.failed.len(),
            })
        }
    }
}

/// Delete every path in `set`.
///
/// Directories are removed recursively, files and symlinks individually.
/// A failure is recorded and the pass moves on. `on_remove` is called after
/// each successful removal.
pub fn reclaim(
    fs: &impl FileSystem,
    set: &ArtifactSet,
    mut on_remove: impl FnMut(&Path),
) -> ReclaimReport {
    let mut report = ReclaimReport {
        failed: set.rejected.clone(),
        ..ReclaimReport::default()
    };

    for path in &set.paths {
        let result = match fs.entry_kind(path) {
            None => {
                report.missing.push(path.clone());
                continue;
            }
            Some(EntryKind::Dir) => fs.remove_dir_all(path),
            Some(EntryKind::File | EntryKind::Symlink) => fs.remove_file(path),
        };

        match result {
            Ok(()) => {
                on_remove(path);
                report.removed.push(path.clone());
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                report.missing.push(path.clone());
            }
            Err(err) => {
                crate::debug!("failed to remove {}: {err}", path.display());
                report.failed.push(ReclaimFailure {
                    path: path.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    report
}
