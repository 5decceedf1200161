//! Build backend handoff
//!
//! extpack never compiles anything itself. The finished specification is
//! wrapped in a [`HandoffDocument`] together with the package metadata and
//! passed to a [`BuildBackend`], which is expected to compile every source,
//! treat depends as invalidation triggers only, and honor the flag lists
//! verbatim.

use super::types::BuildSpecification;
use crate::config::PackageMetadata;
use crate::fs::FileSystem;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Switches passed to the backend alongside the specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendOptions {
    /// Do not generate an export-symbol list when linking the shared library.
    /// The module-definition file already exports what the loader needs on
    /// Windows.
    pub suppress_export_symbols: bool,
}

impl Default for BackendOptions {
    fn default() -> Self {
        Self {
            suppress_export_symbols: true,
        }
    }
}

/// Everything a backend receives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffDocument {
    /// Project root the specification's relative paths are resolved against
    pub project_root: PathBuf,

    /// Platform family the specification was built for
    pub platform: String,

    pub package: PackageMetadata,

    /// Contents of the configured readme, if any
    pub long_description: Option<String>,

    pub extension: BuildSpecification,

    pub options: BackendOptions,
}

/// Consumer of a finished build specification
pub trait BuildBackend {
    /// Hand the document over. Returns the file written, if the backend wrote one.
    fn hand_off(&self, fs: &impl FileSystem, document: &HandoffDocument)
    -> Result<Option<PathBuf>>;
}

/// Where [`JsonBackend`] writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonDestination {
    File(PathBuf),
    Stdout,
}

/// Serializes the handoff document as pretty-printed JSON
#[derive(Debug, Clone)]
pub struct JsonBackend {
    destination: JsonDestination,
}

impl JsonBackend {
    #[must_use]
    pub const fn new(destination: JsonDestination) -> Self {
        Self { destination }
    }

    #[must_use]
    pub fn to_file(path: impl Into<PathBuf>) -> Self {
        Self::new(JsonDestination::File(path.into()))
    }

    #[must_use]
    pub const fn to_stdout() -> Self {
        Self::new(JsonDestination::Stdout)
    }
}

impl BuildBackend for JsonBackend {
    fn hand_off(
        &self,
        fs: &impl FileSystem,
        document: &HandoffDocument,
    ) -> Result<Option<PathBuf>> {
        let json = serde_json::to_string_pretty(document)
            .context("Failed to serialize build specification")?;

        match &self.destination {
            JsonDestination::Stdout => {
                println!("{json}");
                Ok(None)
            }
            JsonDestination::File(path) => {
                if let Some(parent) = path.parent()
                    && !parent.as_os_str().is_empty()
                {
                    fs.make_dirs(parent).with_context(|| {
                        format!("Failed to create output directory: {}", parent.display())
                    })?;
                }
                fs.write(path, format!("{json}\n").as_bytes()).with_context(|| {
                    format!("Failed to write build specification: {}", path.display())
                })?;
                crate::debug!("wrote handoff document to {}", path.display());
                Ok(Some(path.clone()))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests can panic")]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::extensions::spec::SpecBuilder;
    use crate::fs::{MemoryFs, OsFs};
    use crate::platform::PlatformFamily;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn document() -> HandoffDocument {
        let config = Config::default();
        let spec = SpecBuilder::from_config(&config, Path::new("cpp-source"))
            .unwrap()
            .build(PlatformFamily::Posix);
        HandoffDocument {
            project_root: PathBuf::from("."),
            platform: PlatformFamily::Posix.to_string(),
            package: config.package,
            long_description: Some("LIBLINEAR".to_string()),
            extension: spec,
            options: BackendOptions::default(),
        }
    }

    #[test]
    fn writes_json_file_and_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("build/extension.json");
        let backend = JsonBackend::to_file(&output);

        let written = backend.hand_off(&OsFs, &document()).unwrap();

        assert_eq!(written, Some(output.clone()));
        let parsed: HandoffDocument =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(parsed, document());
        assert!(parsed.options.suppress_export_symbols);
    }

    #[test]
    fn writes_through_the_given_filesystem() {
        let memfs = MemoryFs::new();
        memfs.add_dir("/project");
        let backend = JsonBackend::to_file("/project/build/extension.json");

        let written = backend.hand_off(&memfs, &document()).unwrap();

        assert_eq!(written, Some(PathBuf::from("/project/build/extension.json")));
        let contents = memfs.file_contents("/project/build/extension.json").unwrap();
        let text = String::from_utf8(contents).unwrap();
        assert!(text.ends_with("}\n"));
        let parsed: HandoffDocument = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, document());
    }

    #[test]
    fn unwritable_destination_is_reported() {
        let memfs = MemoryFs::new();
        memfs.add_file("/project/build", "not a directory");
        let backend = JsonBackend::to_file("/project/build/extension.json");

        let err = backend.hand_off(&memfs, &document()).unwrap_err();

        assert!(err.to_string().contains("/project/build"));
    }

    #[test]
    fn stdout_writes_no_file() {
        let memfs = MemoryFs::new();
        let backend = JsonBackend::to_stdout();
        assert_eq!(backend.hand_off(&memfs, &document()).unwrap(), None);
        assert!(memfs.paths().is_empty());
    }
}
