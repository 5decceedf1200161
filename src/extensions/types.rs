//! Build specification types
//!
//! A [`BuildSpecification`] is the declarative description of one extension
//! module, handed to an external compiler driver. It is built once per
//! invocation and cannot be modified afterwards: every field is private and
//! only readable.

use super::stager::StageReport;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Declarative compile/link description of one extension module
///
/// Keys follow the extension-build driver convention:
/// - `sources` are compiled
/// - `depends` only invalidate the build when they change
/// - flag lists are passed through verbatim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSpecification {
    name: String,
    sources: Vec<PathBuf>,
    depends: Vec<PathBuf>,
    include_dirs: Vec<PathBuf>,
    language: String,
    extra_compile_args: Vec<String>,
    extra_link_args: Vec<String>,
    define_macros: Vec<(String, String)>,
}

impl BuildSpecification {
    #[allow(clippy::too_many_arguments)]
    pub(crate) const fn new(
        name: String,
        sources: Vec<PathBuf>,
        depends: Vec<PathBuf>,
        include_dirs: Vec<PathBuf>,
        language: String,
        extra_compile_args: Vec<String>,
        extra_link_args: Vec<String>,
        define_macros: Vec<(String, String)>,
    ) -> Self {
        Self {
            name,
            sources,
            depends,
            include_dirs,
            language,
            extra_compile_args,
            extra_link_args,
            define_macros,
        }
    }

    /// Replace the platform-sensitive keys wholesale.
    pub(crate) fn with_platform_keys(
        self,
        define_macros: Vec<(String, String)>,
        extra_link_args: Vec<String>,
    ) -> Self {
        Self {
            define_macros,
            extra_link_args,
            ..self
        }
    }

    /// Dotted module name, e.g. `liblinear.clib`
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn depends(&self) -> &[PathBuf] {
        &self.depends
    }

    pub fn include_dirs(&self) -> &[PathBuf] {
        &self.include_dirs
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn extra_compile_args(&self) -> &[String] {
        &self.extra_compile_args
    }

    pub fn extra_link_args(&self) -> &[String] {
        &self.extra_link_args
    }

    pub fn define_macros(&self) -> &[(String, String)] {
        &self.define_macros
    }
}

/// Result of a `build` run
#[derive(Debug)]
pub struct BuildOutcome {
    /// What the staging pass did (or that it was skipped)
    pub stage: StageReport,

    /// The specification handed to the backend
    pub specification: BuildSpecification,

    /// Where the backend put the handoff, if it wrote one
    pub handoff: Option<PathBuf>,

    /// Wall time for staging, specification and handoff
    pub duration: Duration,
}
