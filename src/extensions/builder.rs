//! Extension Builder Orchestration
//!
//! Coordinates one build invocation:
//! 1. validate the manifest and staging directory (nothing is written on failure)
//! 2. stage sources unless the caller says the tree is already staged
//! 3. build the specification for the resolved platform family
//! 4. hand it to the backend
//!
//! The platform family is resolved by the caller before any of this runs, so
//! an unsupported platform never leaves a staged tree behind.

use super::backend::{BackendOptions, BuildBackend, HandoffDocument};
use super::manifest::{ManifestPath, SourceManifest};
use super::spec::SpecBuilder;
use super::stager::{StageError, StageReport, Stager, StagingState};
use super::types::{BuildOutcome, BuildSpecification};
use crate::config::Config;
use crate::fs::FileSystem;
use crate::platform::PlatformFamily;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Extension build coordinator
///
/// Owns the configuration and resolved locations for one project.
#[derive(Debug, Clone)]
pub struct ExtensionBuilder {
    config: Config,
    project_root: PathBuf,
    origin_root: PathBuf,
    staging_dir: ManifestPath,
}

impl ExtensionBuilder {
    /// Create a builder for the project at `project_root`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidManifestPath` if the configured staging directory is
    /// not a relative path inside the project.
    pub fn new(config: Config, project_root: impl Into<PathBuf>) -> Result<Self, StageError> {
        let project_root = project_root.into();
        let staging_dir = ManifestPath::parse(&config.extension.staging_dir)?;
        let origin_root = config.origin_root(&project_root);

        Ok(Self {
            config,
            project_root,
            origin_root,
            staging_dir,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Staging directory as seen from the project root (e.g. `cpp-source`)
    #[must_use]
    pub fn staging_dir(&self) -> PathBuf {
        self.staging_dir.to_relative_path()
    }

    /// Absolute (or cwd-relative) staging directory
    #[must_use]
    pub fn staging_root(&self) -> PathBuf {
        self.staging_dir.under(&self.project_root)
    }

    pub fn origin_root(&self) -> &Path {
        &self.origin_root
    }

    pub fn manifest(&self) -> Result<SourceManifest, StageError> {
        SourceManifest::from_config(&self.config.extension)
    }

    #[must_use]
    pub fn stager(&self) -> Stager {
        Stager::new(&self.origin_root, self.staging_root())
    }

    /// Specification builder whose paths are relative to the project root
    pub fn spec_builder(&self) -> Result<SpecBuilder, StageError> {
        SpecBuilder::from_config(&self.config, &self.staging_dir())
    }

    /// Check whether the staging directory already exists
    pub fn staging_state(&self, fs: &impl FileSystem) -> StagingState {
        StagingState::detect(fs, &self.staging_root())
    }

    /// Stage sources behind the explicit gate
    pub fn stage(
        &self,
        fs: &impl FileSystem,
        state: StagingState,
    ) -> Result<StageReport, StageError> {
        let manifest = self.manifest()?;
        self.stager().stage_if_needed(fs, &manifest, state)
    }

    /// Specification for `family`, without staging
    pub fn specification(&self, family: PlatformFamily) -> Result<BuildSpecification, StageError> {
        Ok(self.spec_builder()?.build(family))
    }

    /// Wrap a specification with package metadata for the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured readme cannot be read.
    pub fn handoff_document(
        &self,
        fs: &impl FileSystem,
        family: PlatformFamily,
        specification: BuildSpecification,
    ) -> Result<HandoffDocument> {
        let long_description = match &self.config.package.readme {
            Some(readme) => {
                let path = self.project_root.join(readme);
                let text = fs
                    .read_to_string(&path)
                    .with_context(|| format!("Failed to read long description: {}", path.display()))?;
                Some(text)
            }
            None => None,
        };

        Ok(HandoffDocument {
            project_root: self.project_root.clone(),
            platform: family.to_string(),
            package: self.config.package.clone(),
            long_description,
            extension: specification,
            options: BackendOptions {
                suppress_export_symbols: self.config.extension.suppress_export_symbols,
            },
        })
    }

    /// Run a full build: stage, specify, hand off.
    ///
    /// # Errors
    ///
    /// Staging and specification errors abort before the backend runs; they
    /// are never retried.
    pub fn build(
        &self,
        fs: &impl FileSystem,
        state: StagingState,
        family: PlatformFamily,
        backend: &impl BuildBackend,
    ) -> Result<BuildOutcome> {
        let start_time = Instant::now();

        // Validate everything before the first write
        let spec_builder = self.spec_builder()?;

        let stage = self.stage(fs, state)?;
        if stage.skipped {
            crate::debug!("using existing staging tree {}", self.staging_root().display());
        } else {
            crate::debug!(
                "staged {} files ({} bytes) into {}",
                stage.copied.len(),
                stage.bytes,
                self.staging_root().display()
            );
        }

        let specification = spec_builder.build(family);
        let document = self.handoff_document(fs, family, specification.clone())?;
        let handoff = backend.hand_off(fs, &document)?;

        Ok(BuildOutcome {
            stage,
            specification,
            handoff,
            duration: start_time.elapsed(),
        })
    }
}
