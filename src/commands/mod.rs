//! Command implementations

pub(crate) mod build;
pub(crate) mod clean;
pub(crate) mod spec;
pub(crate) mod stage;

use anyhow::{Context, Result};
use extpack::{Config, ExtensionBuilder};
use std::path::Path;

/// Load configuration and set up the builder for `project`
fn load_builder(project: &Path, config_path: Option<&Path>) -> Result<ExtensionBuilder> {
    let config = Config::load_with_options(project, config_path)?;
    ExtensionBuilder::new(config, project)
        .with_context(|| format!("Invalid extension config for {}", project.display()))
}
