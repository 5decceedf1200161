//! extpack internal library code
//!
//! Stages native sources into a Python package, describes how to compile them
//! for the target platform family, and reclaims the artifacts afterwards.

pub mod config;
pub mod debug;
pub mod env_vars;
pub mod extensions;
pub mod fs;
pub mod paths;
pub mod platform;
pub mod reclaim;

// Re-export common types for convenience
pub use config::{CONFIG_FILE_NAME, CleanConfig, Config, ExtensionConfig, PackageMetadata};
pub use debug::{init_debug, is_debug_enabled};
pub use extensions::{
    BackendOptions, BuildBackend, BuildOutcome, BuildSpecification, ExtensionBuilder,
    HandoffDocument, JsonBackend, JsonDestination, ManifestPath, SourceManifest, SpecBuilder,
    StageError, StageReport, Stager, StagingState,
};
pub use fs::{Entry, EntryKind, FileSystem, MemoryFs, OsFs};
pub use platform::{PlatformError, PlatformFamily};
pub use reclaim::{
    ArtifactSet, ReclaimError, ReclaimFailure, ReclaimReport, ReclaimRules, collect_artifacts,
    conventional_artifacts, reclaim,
};
