//! Source staging
//!
//! Copies the manifest's files from the origin directory (outside the
//! package root) into the package-local staging directory, mirroring their
//! relative layout. It's the equivalent of:
//! ```bash
//! mkdir -p cpp-source/blas
//! cp ../blas/daxpy.c cpp-source/blas/daxpy.c
//! cp ../linear.cpp   cpp-source/linear.cpp
//! ```

use super::manifest::{ManifestPath, SourceManifest};
use crate::fs::FileSystem;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StageError {
    #[error("Source file not found in origin: {}", .path.display())]
    MissingSource { path: PathBuf },

    #[error("Invalid manifest path '{entry}': {reason}")]
    InvalidManifestPath { entry: String, reason: &'static str },

    #[error("Failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Whether the staging directory is already populated
///
/// Computed once by the caller and passed in, so the gate is explicit. The
/// check is directory-level only: a changed origin is not noticed until the
/// staging directory is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagingState {
    Fresh,
    AlreadyStaged,
}

impl StagingState {
    /// Check the filesystem for an existing staging directory
    pub fn detect(fs: &impl FileSystem, staging_root: &Path) -> Self {
        if fs.exists(staging_root) {
            Self::AlreadyStaged
        } else {
            Self::Fresh
        }
    }
}

/// What a staging pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageReport {
    /// Staged files written by this pass, in manifest order
    pub copied: Vec<PathBuf>,
    /// Total bytes copied
    pub bytes: u64,
    /// True when the pass was skipped because the tree was already staged
    pub skipped: bool,
}

/// Source stager
///
/// The sole writer of the staging directory.
#[derive(Debug, Clone)]
pub struct Stager {
    origin_root: PathBuf,
    staging_root: PathBuf,
}

impl Stager {
    #[must_use]
    pub fn new(origin_root: impl Into<PathBuf>, staging_root: impl Into<PathBuf>) -> Self {
        Self {
            origin_root: origin_root.into(),
            staging_root: staging_root.into(),
        }
    }

    pub fn origin_root(&self) -> &Path {
        &self.origin_root
    }

    pub fn staging_root(&self) -> &Path {
        &self.staging_root
    }

    /// Staged location of a manifest entry
    #[must_use]
    pub fn staged_path(&self, entry: &ManifestPath) -> PathBuf {
        entry.under(&self.staging_root)
    }

    /// Stage unless `state` says the tree is already there.
    pub fn stage_if_needed(
        &self,
        fs: &impl FileSystem,
        manifest: &SourceManifest,
        state: StagingState,
    ) -> Result<StageReport, StageError> {
        match state {
            StagingState::AlreadyStaged => {
                crate::debug!(
                    "staging skipped, {} already exists",
                    self.staging_root.display()
                );
                Ok(StageReport {
                    skipped: true,
                    ..StageReport::default()
                })
            }
            StagingState::Fresh => self.stage(fs, manifest),
        }
    }

    /// Copy every manifest entry from the origin into the staging tree.
    ///
    /// Every origin file is checked before anything is written, so a missing
    /// source leaves no trace. If a copy fails midway and this pass created
    /// the staging root, the root is removed again.
    pub fn stage(
        &self,
        fs: &impl FileSystem,
        manifest: &SourceManifest,
    ) -> Result<StageReport, StageError> {
        for entry in manifest.entries() {
            let origin = entry.under(&self.origin_root);
            if !fs.exists(&origin) {
                return Err(StageError::MissingSource { path: origin });
            }
        }

        let created_root = !fs.exists(&self.staging_root);

        let result = self.copy_all(fs, manifest);
        if result.is_err() && created_root && fs.exists(&self.staging_root) {
            crate::debug!(
                "staging failed, removing partial tree {}",
                self.staging_root.display()
            );
            if let Err(err) = fs.remove_dir_all(&self.staging_root) {
                crate::debug!("could not remove partial staging tree: {err}");
            }
        }
        result
    }

    fn copy_all(
        &self,
        fs: &impl FileSystem,
        manifest: &SourceManifest,
    ) -> Result<StageReport, StageError> {
        let mut report = StageReport::default();

        fs.make_dirs(&self.staging_root)
            .map_err(|source| StageError::Io {
                action: "create directory",
                path: self.staging_root.clone(),
                source,
            })?;

        for entry in manifest.entries() {
            let origin = entry.under(&self.origin_root);
            let target = self.staged_path(entry);

            if let Some(parent) = target.parent() {
                fs.make_dirs(parent).map_err(|source| StageError::Io {
                    action: "create directory",
                    path: parent.to_path_buf(),
                    source,
                })?;
            }

            crate::debug!("copying {} -> {}", origin.display(), target.display());
            let bytes = fs.copy(&origin, &target).map_err(|source| StageError::Io {
                action: "copy",
                path: origin.clone(),
                source,
            })?;

            report.bytes += bytes;
            report.copied.push(target);
        }

        Ok(report)
    }
}
