//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`RelayContext`] for the environment and config every command shares
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands};
use crate::config::environment::WORKSPACE_VAR;
use crate::config::{load_config, PipelineConfig, ReleaseEnv};
use crate::error::Result;

/// Trait for command implementations.
pub trait Command {
    /// Execute the command.
    ///
    /// Per-package failures are part of a successful run; only errors that
    /// stop the whole stage are returned as `Err`.
    fn execute(&self) -> Result<CommandResult>;
}

/// Result of command execution.
///
/// Stage-level failures travel as `Err`; a command that returns a result
/// finished its stage.
#[derive(Debug)]
pub struct CommandResult {
    /// Exit code to use.
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self { exit_code: 0 }
    }
}

/// Environment and configuration shared by every command.
#[derive(Debug, Clone)]
pub struct RelayContext {
    pub env: ReleaseEnv,
    pub config: PipelineConfig,
}

impl RelayContext {
    /// Read the environment through `lookup`, then load the config.
    ///
    /// A workspace override stands in for `GITHUB_WORKSPACE`.
    pub fn load<F>(lookup: F, workspace: Option<&Path>, config: Option<&Path>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = ReleaseEnv::from_lookup(|name| match workspace {
            Some(path) if name == WORKSPACE_VAR => Some(path.to_string_lossy().to_string()),
            _ => lookup(name),
        })?;
        let config = load_config(&env.workspace, config)?;
        tracing::debug!("Loaded {} packages for {:?}", config.packages.len(), env);

        Ok(Self { env, config })
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    workspace: Option<PathBuf>,
    config: Option<PathBuf>,
}

impl CommandDispatcher {
    /// Create a dispatcher carrying the global CLI overrides.
    pub fn new(workspace: Option<PathBuf>, config: Option<PathBuf>) -> Self {
        Self { workspace, config }
    }

    pub fn from_cli(cli: &Cli) -> Self {
        Self::new(cli.workspace.clone(), cli.config.clone())
    }

    /// Dispatch using the process environment.
    pub fn dispatch(&self, command: &Commands) -> Result<CommandResult> {
        self.dispatch_with(command, |name| std::env::var(name).ok())
    }

    /// Dispatch using an arbitrary environment lookup.
    ///
    /// The environment is validated before anything else happens.
    pub fn dispatch_with<F>(&self, command: &Commands, lookup: F) -> Result<CommandResult>
    where
        F: Fn(&str) -> Option<String>,
    {
        let context = RelayContext::load(lookup, self.workspace.as_deref(), self.config.as_deref())?;

        match command {
            Commands::Prepare => super::prepare::PrepareCommand::new(context).execute(),
            Commands::Build(args) => {
                super::build::BuildCommand::new(context, args.clone()).execute()
            }
            Commands::Registry => super::registry::RegistryCommand::new(context).execute(),
            Commands::Status => super::status::StatusCommand::new(context).execute(),
        }
    }
}
