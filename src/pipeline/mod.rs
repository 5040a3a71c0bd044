//! The three release stages and the data passed between them.
//!
//! - [`prepare`] decides what to release and writes the handoff manifest
//! - [`build`] builds and uploads manifest entries for one platform
//! - [`registry`] regenerates the plugin registry from the catalog

pub mod archive;
pub mod build;
pub mod manifest;
pub mod outcome;
pub mod platform;
pub mod prepare;
pub mod registry;

pub use archive::zip_dir;
pub use build::{BuildRunner, Builder, SystemRunner};
pub use manifest::{HandoffManifest, ManifestEntry};
pub use outcome::{BatchReport, Outcome, UnitReport};
pub use platform::Platform;
pub use prepare::{plan_releases, PackagePlan, PrepareRun, Preparer};
pub use registry::{
    build_registry, content_digest, write_if_changed, RegistryDocument, RegistryEntry,
    RegistryGenerator, RegistryOutcome, RegistryRun,
};
