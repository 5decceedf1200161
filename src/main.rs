//! extpack command-line interface
//!
//! Native extension staging, build specification and cleanup for Python packages

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process;

/// Display an error and its cause chain
fn display_error(err: &anyhow::Error) {
    eprintln!("error: {err}");

    let mut source = err.source();
    while let Some(err) = source {
        eprintln!("caused by: {err}");
        source = err.source();
    }
}

#[derive(Parser)]
#[command(name = "extpack")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Native extension build orchestrator for Python packages", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Project root (directory containing the package)
    #[arg(long, short = 'C', global = true, default_value = ".")]
    project: PathBuf,

    /// Config file to use instead of <project>/.extpack.toml
    #[arg(long, global = true, env = "EXTPACK_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Stage sources (if needed) and hand the build specification to the backend
    Build {
        /// Target platform identifier (e.g. linux, darwin, win32)
        #[arg(long, env = "EXTPACK_PLATFORM")]
        platform: Option<String>,

        /// Where to write the handoff document
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Print the handoff document instead of writing it
        #[arg(long, conflicts_with = "output")]
        stdout: bool,
    },

    /// Copy sources from the origin directory into the staging directory
    Stage,

    /// Print the build specification without staging anything
    Spec {
        /// Target platform identifier (e.g. linux, darwin, win32)
        #[arg(long, env = "EXTPACK_PLATFORM")]
        platform: Option<String>,
    },

    /// Remove build artifacts, staged sources and bytecode caches
    Clean {
        /// Also remove every intermediate tree under build/
        #[arg(long, short)]
        all: bool,

        /// List what would be removed without removing it
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    extpack::init_debug(cli.global.debug);

    let project = cli.global.project.as_path();
    let config = cli.global.config.as_deref();

    let result = match cli.command {
        Commands::Build {
            platform,
            output,
            stdout,
        } => {
            let options = commands::build::BuildOptions {
                platform: platform.as_deref(),
                output: output.as_deref(),
                stdout,
            };
            commands::build::run(project, config, &options)
        }
        Commands::Stage => commands::stage::run(project, config),
        Commands::Spec { platform } => commands::spec::run(project, config, platform.as_deref()),
        Commands::Clean { all, dry_run } => commands::clean::run(project, config, all, dry_run),
    };

    if let Err(e) = result {
        display_error(&e);
        process::exit(1);
    }
}

mod commands;
