//! CLI argument definitions.
//!
//! The main entry point is the [`Cli`] struct.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::pipeline::Platform;

/// Release pipeline for a multi-package repository.
#[derive(Debug, Parser)]
#[command(name = "release-relay")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the pipeline config (default .github/release.yml in the workspace)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Workspace root (overrides GITHUB_WORKSPACE)
    #[arg(short, long, global = true)]
    pub workspace: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create releases for packages with new versions and write the manifest
    Prepare,

    /// Build and upload manifest entries for one platform
    Build(BuildArgs),

    /// Regenerate the plugin registry document
    Registry,

    /// Show what `prepare` would release, without changing anything
    Status,
}

/// Arguments for the `build` command.
#[derive(Debug, Clone, Args)]
pub struct BuildArgs {
    /// Platform this job builds for
    #[arg(long, value_enum)]
    pub platform: Platform,
}
