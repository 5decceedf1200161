//! Shared test helpers and utilities

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Files of the native library that the package stages
const NATIVE_FILES: &[(&str, &str)] = &[
    ("blas/daxpy.c", "int daxpy_() { return 0; }\n"),
    ("blas/ddot.c", "double ddot_() { return 0; }\n"),
    ("blas/dnrm2.c", "double dnrm2_() { return 0; }\n"),
    ("blas/dscal.c", "int dscal_() { return 0; }\n"),
    ("blas/blas.h", "#include \"blasp.h\"\n"),
    ("blas/blasp.h", "/* prototypes */\n"),
    ("linear.cpp", "#include \"linear.h\"\n"),
    ("newton.cpp", "#include \"newton.h\"\n"),
    ("newton.h", "#pragma once\n"),
    ("linear.h", "#pragma once\n"),
    ("linear.def", "LIBRARY liblinear\nEXPORTS\n"),
];

/// Run the extpack binary against `project`.
///
/// `EXTPACK_*` variables from the outer environment are cleared so tests
/// see built-in defaults.
pub(crate) fn run_extpack(project: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_extpack"))
        .arg("--project")
        .arg(project)
        .args(args)
        .env_remove("EXTPACK_CONFIG")
        .env_remove("EXTPACK_PLATFORM")
        .env_remove("EXTPACK_DEBUG")
        .env_remove("EXTPACK_ORIGIN")
        .output()
        .expect("Failed to execute extpack")
}

/// A library checkout with the Python package in a `python/` subdirectory,
/// so the default origin (`..`) points at the native sources.
pub(crate) struct LiblinearCheckout {
    // Held for its Drop
    _temp: TempDir,
    #[allow(dead_code)]
    pub(crate) root: PathBuf,
    pub(crate) project: PathBuf,
}

impl LiblinearCheckout {
    pub(crate) fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let root = temp.path().to_path_buf();
        let project = root.join("python");

        for (path, contents) in NATIVE_FILES {
            write_file(&root.join(path), contents);
        }
        write_file(&project.join("README"), "Python interface of multi-core LIBLINEAR\n");
        write_file(&project.join("setup.py"), "from setuptools import setup\n");
        write_file(&project.join("liblinear/__init__.py"), "");
        write_file(&project.join("liblinear/liblinear.py"), "from .clib import *\n");

        Self {
            _temp: temp,
            root,
            project,
        }
    }

    /// Write `.extpack.toml` in the project
    #[allow(dead_code)]
    pub(crate) fn write_config(&self, contents: &str) {
        write_file(&self.project.join(".extpack.toml"), contents);
    }

    /// Native files staged by the default manifest
    #[allow(dead_code)]
    pub(crate) fn native_files() -> impl Iterator<Item = &'static str> {
        NATIVE_FILES.iter().map(|(path, _)| *path)
    }
}

#[allow(dead_code)]
pub(crate) fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(path, contents).expect("Failed to write file");
}

#[allow(dead_code)]
pub(crate) fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[allow(dead_code)]
pub(crate) fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}
