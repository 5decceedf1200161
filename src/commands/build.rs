//! Build command
//!
//! Stage sources if the staging directory is missing, then hand the build
//! specification to the backend

use anyhow::Result;
use extpack::{JsonBackend, OsFs, PlatformFamily};
use std::path::Path;

pub(crate) struct BuildOptions<'a> {
    pub(crate) platform: Option<&'a str>,
    pub(crate) output: Option<&'a Path>,
    pub(crate) stdout: bool,
}

pub(crate) fn run(project: &Path, config: Option<&Path>, options: &BuildOptions<'_>) -> Result<()> {
    let builder = super::load_builder(project, config)?;

    // Resolve the platform before anything touches the disk
    let family = PlatformFamily::resolve(options.platform)?;

    let backend = if options.stdout {
        JsonBackend::to_stdout()
    } else {
        let output = options.output.map_or_else(
            || project.join(&builder.config().extension.output),
            Path::to_path_buf,
        );
        JsonBackend::to_file(output)
    };

    let state = builder.staging_state(&OsFs);
    let outcome = builder.build(&OsFs, state, family, &backend)?;

    if options.stdout {
        return Ok(());
    }

    if outcome.stage.skipped {
        println!(
            "Using existing staging directory {}",
            builder.staging_root().display()
        );
    } else {
        println!(
            "Staged {} files into {}",
            outcome.stage.copied.len(),
            builder.staging_root().display()
        );
    }
    if let Some(path) = &outcome.handoff {
        println!(
            "Wrote {} specification for {} to {}",
            family,
            outcome.specification.name(),
            path.display()
        );
    }
    extpack::debug!("build finished in {:.2?}", outcome.duration);

    Ok(())
}
