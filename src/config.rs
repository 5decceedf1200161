//! Configuration file management
//!
//! Reads the project's `.extpack.toml`. Every key is optional; missing keys
//! fall back to the built-in values, which package multi-core LIBLINEAR.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the project-local configuration
pub const CONFIG_FILE_NAME: &str = ".extpack.toml";

/// Application configuration loaded from TOML files
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Static package metadata handed through to the backend
    pub package: PackageMetadata,

    /// What to stage and how the extension module is compiled
    pub extension: ExtensionConfig,

    /// Extra artifact rules for `clean`
    pub clean: CleanConfig,
}

/// Package metadata carried into the handoff document
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct PackageMetadata {
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: String,
    pub author_email: String,
    pub url: String,
    /// Host-language packages shipped alongside the extension
    pub packages: Vec<String>,
    pub install_requires: Vec<String>,
    /// File whose contents become the long description, relative to the project root
    pub readme: Option<String>,
    pub long_description_content_type: String,
}

impl Default for PackageMetadata {
    fn default() -> Self {
        Self {
            name: "liblinear-multicore".to_string(),
            version: "2.43.0".to_string(),
            description: "Python binding of multi-core LIBLINEAR".to_string(),
            author: "ML group @ National Taiwan University".to_string(),
            author_email: "cjlin@csie.ntu.edu.tw".to_string(),
            url: "https://www.csie.ntu.edu.tw/~cjlin/libsvmtools/multicore-liblinear".to_string(),
            packages: vec!["liblinear".to_string()],
            install_requires: vec!["scipy".to_string()],
            readme: Some("README".to_string()),
            long_description_content_type: "text/plain".to_string(),
        }
    }
}

/// Extension module description
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExtensionConfig {
    /// Package directory the compiled module is installed into
    pub package_dir: String,
    /// Module name; must match the name the runtime loader looks for
    pub module_name: String,
    /// Where the canonical sources live, relative to the project root unless absolute
    pub origin_dir: String,
    /// Staging directory name, relative to the project root
    pub staging_dir: String,
    /// Language tag for the compiler driver
    pub language: String,
    /// Compiled units, relative to the origin
    pub sources: Vec<String>,
    /// Headers and definition files: tracked, not compiled
    pub depends: Vec<String>,
    pub extra_compile_args: Vec<String>,
    pub extra_link_args: Vec<String>,
    /// Module-definition file (relative to the staging root) used on Windows
    pub module_definition: String,
    /// Linker flags appended after the module-definition directive on Windows
    pub windows_link_args: Vec<String>,
    /// Preprocessor symbols defined on Windows
    pub windows_define_macros: Vec<(String, String)>,
    /// Where `build` writes the handoff document, relative to the project root
    pub output: String,
    /// Ask the backend not to generate an export-symbol list
    pub suppress_export_symbols: bool,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        let strings = |items: &[&str]| -> Vec<String> {
            items.iter().map(ToString::to_string).collect()
        };

        Self {
            package_dir: "liblinear".to_string(),
            module_name: "clib".to_string(),
            origin_dir: "..".to_string(),
            staging_dir: "cpp-source".to_string(),
            language: "c++".to_string(),
            sources: strings(&[
                "blas/daxpy.c",
                "blas/ddot.c",
                "blas/dnrm2.c",
                "blas/dscal.c",
                "linear.cpp",
                "newton.cpp",
            ]),
            depends: strings(&[
                "blas/blas.h",
                "blas/blasp.h",
                "newton.h",
                "linear.h",
                "linear.def",
            ]),
            extra_compile_args: strings(&["-fopenmp"]),
            extra_link_args: strings(&["-lgomp"]),
            module_definition: "linear.def".to_string(),
            windows_link_args: strings(&["-lgomp"]),
            windows_define_macros: vec![
                ("_WIN64".to_string(), String::new()),
                ("_CRT_SECURE_NO_DEPRECATE".to_string(), String::new()),
            ],
            output: "build/extension.json".to_string(),
            suppress_export_symbols: true,
        }
    }
}

/// Artifact rules for `clean`
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct CleanConfig {
    /// Build and distribution output directories, relative to the project root
    pub output_dirs: Vec<String>,
    /// Other fixed files or directories to remove
    pub extra_paths: Vec<String>,
    /// Directory names removed wherever they appear under the project root
    pub cache_dir_names: Vec<String>,
    /// File extensions (without the dot) removed wherever they appear
    pub cache_file_extensions: Vec<String>,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            output_dirs: vec!["build".to_string(), "dist".to_string()],
            extra_paths: vec!["MANIFEST".to_string()],
            cache_dir_names: vec!["__pycache__".to_string()],
            cache_file_extensions: vec!["pyc".to_string()],
        }
    }
}

impl Config {
    /// Load configuration for the project at `project_root`.
    /// Priority: `EXTPACK_CONFIG` -> `<project>/.extpack.toml` -> defaults
    ///
    /// # Errors
    ///
    /// Returns an error if config file parsing fails.
    pub fn load(project_root: &Path) -> Result<Self> {
        Self::load_with_options(project_root, None)
    }

    /// Load configuration with a custom path.
    ///
    /// # Arguments
    /// * `project_root` - Directory searched for `.extpack.toml`
    /// * `custom_path` - Config file that overrides every default location
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file is missing, or if any
    /// config file cannot be read or parsed.
    pub fn load_with_options(project_root: &Path, custom_path: Option<&Path>) -> Result<Self> {
        // Explicit path (flag, then environment) must exist
        let explicit = custom_path
            .map(Path::to_path_buf)
            .or_else(|| crate::env_vars::extpack_config().map(PathBuf::from));
        if let Some(path) = explicit {
            return Self::load_from(&path);
        }

        let local = project_root.join(CONFIG_FILE_NAME);
        if local.exists() {
            return Self::load_from(&local);
        }

        Ok(Self::default())
    }

    fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Dotted module name, e.g. `liblinear.clib`
    #[must_use]
    pub fn module_path(&self) -> String {
        format!(
            "{}.{}",
            self.extension.package_dir, self.extension.module_name
        )
    }

    /// Metadata directory the packaging step writes, e.g. `liblinear-multicore.egg-info`
    #[must_use]
    pub fn metadata_dir_name(&self) -> String {
        format!("{}.egg-info", self.package.name)
    }

    /// Origin directory resolved against the project root (`EXTPACK_ORIGIN` wins).
    #[must_use]
    pub fn origin_root(&self, project_root: &Path) -> PathBuf {
        let origin = crate::env_vars::extpack_origin()
            .unwrap_or_else(|| self.extension.origin_dir.clone());
        project_root.join(origin)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests can panic")]
mod tests {
    use super::*;

    mod defaults {
        use super::*;

        #[test]
        fn package_liblinear() {
            let config = Config::default();
            assert_eq!(config.package.name, "liblinear-multicore");
            assert_eq!(config.module_path(), "liblinear.clib");
            assert_eq!(config.metadata_dir_name(), "liblinear-multicore.egg-info");
            assert_eq!(config.extension.staging_dir, "cpp-source");
            assert_eq!(config.extension.sources.len(), 6);
            assert_eq!(config.extension.depends.len(), 5);
            assert_eq!(config.extension.extra_compile_args, vec!["-fopenmp"]);
            assert_eq!(config.extension.extra_link_args, vec!["-lgomp"]);
            assert!(config.extension.suppress_export_symbols);
        }

        #[test]
        fn clean_rules() {
            let clean = CleanConfig::default();
            assert_eq!(clean.output_dirs, vec!["build", "dist"]);
            assert_eq!(clean.extra_paths, vec!["MANIFEST"]);
            assert_eq!(clean.cache_dir_names, vec!["__pycache__"]);
            assert_eq!(clean.cache_file_extensions, vec!["pyc"]);
        }
    }

    mod loading {
        use super::*;
        use tempfile::TempDir;

        #[test]
        fn missing_local_file_uses_defaults() {
            let temp = TempDir::new().unwrap();
            let config = Config::load_with_options(temp.path(), None).unwrap();
            assert_eq!(config, Config::default());
        }

        #[test]
        fn partial_file_keeps_other_defaults() -> Result<()> {
            let temp = TempDir::new()?;
            fs::write(
                temp.path().join(CONFIG_FILE_NAME),
                r#"
[package]
name = "demo"

[extension]
staging_dir = "native"
sources = ["a.c"]
depends = ["a.h"]
windows_define_macros = [["WIN32", "1"]]
"#,
            )?;

            let config = Config::load_with_options(temp.path(), None)?;
            assert_eq!(config.package.name, "demo");
            assert_eq!(config.package.version, "2.43.0");
            assert_eq!(config.extension.staging_dir, "native");
            assert_eq!(config.extension.sources, vec!["a.c"]);
            assert_eq!(
                config.extension.windows_define_macros,
                vec![("WIN32".to_string(), "1".to_string())]
            );
            assert_eq!(config.extension.module_name, "clib");
            assert_eq!(config.clean, CleanConfig::default());
            Ok(())
        }

        #[test]
        fn explicit_path_must_exist() {
            let temp = TempDir::new().unwrap();
            let missing = temp.path().join("nope.toml");
            let err = Config::load_with_options(temp.path(), Some(&missing)).unwrap_err();
            assert!(err.to_string().contains("Failed to read config file"));
        }

        #[test]
        fn malformed_file_is_an_error() {
            let temp = TempDir::new().unwrap();
            fs::write(temp.path().join(CONFIG_FILE_NAME), "[extension\nsources = 3").unwrap();
            let err = Config::load_with_options(temp.path(), None).unwrap_err();
            assert!(err.to_string().contains("Failed to parse config file"));
        }
    }
}
