//! Clean command
//!
//! Remove build output, staged sources, packaging metadata and bytecode
//! caches from the project

use anyhow::{Context, Result};
use extpack::{
    ArtifactSet, Config, OsFs, ReclaimReport, ReclaimRules, collect_artifacts,
    conventional_artifacts, reclaim,
};
use std::path::Path;

pub(crate) fn run(project: &Path, config_path: Option<&Path>, all: bool, dry_run: bool) -> Result<()> {
    let config = Config::load_with_options(project, config_path)?;
    let rules = ReclaimRules::from_config(&config);

    // Conventional cleanup first, then the package-specific artifacts
    let conventional = conventional_artifacts(&OsFs, project, all);

    if dry_run {
        let custom = collect_artifacts(&OsFs, project, &rules);
        let listed = print_planned(&conventional) + print_planned(&custom);
        if listed == 0 {
            println!("Nothing to clean");
        }
        return Ok(());
    }

    let print_removal = |path: &Path| println!("remove {}", path.display());

    let mut report = reclaim(&OsFs, &conventional, print_removal);
    // Collected after the first pass so nothing it removed is listed again
    let custom = collect_artifacts(&OsFs, project, &rules);
    report.merge(reclaim(&OsFs, &custom, print_removal));

    print_failures(&report);
    if report.removed.is_empty() && report.failed.is_empty() {
        println!("Nothing to clean");
    }

    report
        .into_result()
        .with_context(|| format!("Clean of {} incomplete", project.display()))?;

    Ok(())
}

fn print_planned(set: &ArtifactSet) -> usize {
    for path in set.paths() {
        println!("Would remove: {}", path.display());
    }
    for failure in set.rejected() {
        println!("Would skip: {} ({})", failure.path.display(), failure.reason);
    }
    set.paths().len() + set.rejected().len()
}

fn print_failures(report: &ReclaimReport) {
    for failure in &report.failed {
        eprintln!(
            "warning: could not remove {}: {}",
            failure.path.display(),
            failure.reason
        );
    }
}
