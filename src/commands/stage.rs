//! Stage command
//!
//! Copy the manifest from the origin directory into the staging directory

use anyhow::Result;
use extpack::OsFs;
use std::path::Path;

pub(crate) fn run(project: &Path, config: Option<&Path>) -> Result<()> {
    let builder = super::load_builder(project, config)?;

    let state = builder.staging_state(&OsFs);
    let report = builder.stage(&OsFs, state)?;

    if report.skipped {
        println!(
            "{} already exists, remove it to restage",
            builder.staging_root().display()
        );
        return Ok(());
    }

    let stager = builder.stager();
    let manifest = builder.manifest()?;
    for entry in manifest.entries() {
        println!(
            "copying {} -> {}",
            entry.under(stager.origin_root()).display(),
            stager.staged_path(entry).display()
        );
    }
    println!(
        "Staged {} files ({} bytes)",
        report.copied.len(),
        report.bytes
    );

    Ok(())
}
