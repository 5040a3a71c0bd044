//! release-relay - release pipeline for multi-package repositories.
//!
//! A repository holding several independently versioned packages (native
//! binaries, WebAssembly plugins, script plugins, a web bundle) is released
//! in three CI stages:
//!
//! 1. `prepare` compares each package's declared version with the newest
//!    published release, tags and creates releases for the newer ones, bumps
//!    the umbrella package, and writes a handoff manifest.
//! 2. `build --platform <name>` runs once per platform, building and
//!    uploading exactly what the manifest lists.
//! 3. `registry` regenerates the plugin registry document from the catalog.
//!
//! # Modules
//!
//! - [`catalog`] - Release host API, tag publishing, release matching
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Pipeline configuration and process environment
//! - [`error`] - Error types and result aliases
//! - [`pipeline`] - The three stages and their handoff data
//! - [`shell`] - External process execution
//! - [`version`] - Version reading, comparison and bumping
//!
//! # Example
//!
//! ```
//! use release_relay::version::{classify, is_newer, BuildState};
//!
//! assert!(is_newer("2.0.0", Some("1.9.9")));
//! assert!(!is_newer("1.0.0", Some("1.0.0")));
//! assert_eq!(classify("0.5.0"), BuildState::Beta);
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod shell;
pub mod version;

pub use error::{RelayError, Result};
