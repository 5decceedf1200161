//! Native extension build orchestration
//!
//! Stages sources from an external origin directory into the package, builds
//! a declarative compile/link specification for the target platform family
//! and hands it to a build backend. Nothing here runs a compiler.
//!
//! - [`manifest`]: validated relative paths and the source manifest
//! - [`stager`]: copies the manifest into the staging directory
//! - [`spec`]: base specification plus the Windows override
//! - [`backend`]: handoff document and the JSON backend
//! - [`builder`]: ties the above together for one project

pub mod backend;
pub mod builder;
pub mod manifest;
pub mod spec;
pub mod stager;
pub mod types;

pub use backend::{BackendOptions, BuildBackend, HandoffDocument, JsonBackend, JsonDestination};
pub use builder::ExtensionBuilder;
pub use manifest::{ManifestPath, SourceManifest};
pub use spec::SpecBuilder;
pub use stager::{StageError, StageReport, Stager, StagingState};
pub use types::{BuildOutcome, BuildSpecification};
