//! Build specification builder
//!
//! Turns the staged manifest into a [`BuildSpecification`] for the target
//! platform family. The base specification is platform-independent; the
//! Windows family replaces `define_macros` and `extra_link_args` outright
//! (module-definition file + compatibility macros) instead of merging with
//! the POSIX flags.

use super::manifest::{ManifestPath, SourceManifest};
use super::stager::StageError;
use super::types::BuildSpecification;
use crate::config::Config;
use crate::platform::{PlatformError, PlatformFamily};
use std::path::{Path, PathBuf};

/// Builds specifications from a manifest and a staging root
#[derive(Debug, Clone)]
pub struct SpecBuilder {
    name: String,
    staging_root: PathBuf,
    manifest: SourceManifest,
    language: String,
    extra_compile_args: Vec<String>,
    extra_link_args: Vec<String>,
    module_definition: ManifestPath,
    windows_link_args: Vec<String>,
    windows_define_macros: Vec<(String, String)>,
}

impl SpecBuilder {
    /// Create a builder from configuration.
    ///
    /// `staging_root` is used verbatim in every emitted path, so pass it in
    /// the form the compiler driver expects (usually relative to the project).
    pub fn from_config(config: &Config, staging_root: &Path) -> Result<Self, StageError> {
        let extension = &config.extension;
        Ok(Self {
            name: config.module_path(),
            staging_root: staging_root.to_path_buf(),
            manifest: SourceManifest::from_config(extension)?,
            language: extension.language.clone(),
            extra_compile_args: extension.extra_compile_args.clone(),
            extra_link_args: extension.extra_link_args.clone(),
            module_definition: ManifestPath::parse(&extension.module_definition)?,
            windows_link_args: extension.windows_link_args.clone(),
            windows_define_macros: extension.windows_define_macros.clone(),
        })
    }

    pub fn manifest(&self) -> &SourceManifest {
        &self.manifest
    }

    /// Platform-independent specification
    #[must_use]
    pub fn base(&self) -> BuildSpecification {
        let staged = |entries: &[ManifestPath]| -> Vec<PathBuf> {
            entries
                .iter()
                .map(|entry| entry.under(&self.staging_root))
                .collect()
        };

        BuildSpecification::new(
            self.name.clone(),
            staged(self.manifest.sources()),
            staged(self.manifest.depends()),
            vec![self.staging_root.clone()],
            self.language.clone(),
            self.extra_compile_args.clone(),
            self.extra_link_args.clone(),
            Vec::new(),
        )
    }

    /// Specification for `family`
    #[must_use]
    pub fn build(&self, family: PlatformFamily) -> BuildSpecification {
        let base = self.base();
        match family {
            PlatformFamily::Posix => base,
            PlatformFamily::Windows => {
                let mut link_args = vec![format!(
                    "-DEF:{}\\{}",
                    windows_separators(&self.staging_root),
                    self.module_definition.components().join("\\")
                )];
                link_args.extend(self.windows_link_args.iter().cloned());

                base.with_platform_keys(self.windows_define_macros.clone(), link_args)
            }
        }
    }

    /// Specification for a platform identifier such as `win32` or `linux`.
    pub fn build_for(&self, identifier: &str) -> Result<BuildSpecification, PlatformError> {
        Ok(self.build(identifier.parse()?))
    }
}

fn windows_separators(path: &Path) -> String {
    path.to_string_lossy().replace('/', "\\")
}
