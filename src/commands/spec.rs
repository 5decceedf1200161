//! Spec command
//!
//! Print the build specification for a platform. Nothing is staged or written.

use anyhow::{Context, Result};
use extpack::PlatformFamily;
use std::path::Path;

pub(crate) fn run(project: &Path, config: Option<&Path>, platform: Option<&str>) -> Result<()> {
    let builder = super::load_builder(project, config)?;
    let family = PlatformFamily::resolve(platform)?;

    let specification = builder.specification(family)?;
    let json = serde_json::to_string_pretty(&specification)
        .context("Failed to serialize build specification")?;
    println!("{json}");

    Ok(())
}
