//! Configuration loading, parsing, and validation.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Validation in [`validator`]
//! - Process environment in [`environment`]
//!
//! # Example
//!
//! ```
//! use release_relay::config::load_config;
//! use std::fs;
//! use tempfile::TempDir;
//!
//! let temp = TempDir::new().unwrap();
//! fs::create_dir_all(temp.path().join(".github")).unwrap();
//! fs::write(
//!     temp.path().join(".github/release.yml"),
//!     "packages:\n  - id: natomanga\n    kind: interpreted-plugin\n    plugin_file: natomanga.lua\n",
//! )
//! .unwrap();
//!
//! let config = load_config(temp.path(), None).unwrap();
//! assert_eq!(config.packages[0].prefix(), "natomanga");
//! ```

pub mod environment;
pub mod loader;
pub mod schema;
pub mod validator;

pub use environment::ReleaseEnv;
pub use loader::{config_path, load_config, load_config_file, DEFAULT_CONFIG_PATH};
pub use schema::{PackageKind, PackageSpec, PipelineConfig, PluginArtifact, PluginSpec};
pub use validator::{validate, validate_config};
