//! Prepare command implementation.
//!
//! The `release-relay prepare` command runs stage 1.

use crate::catalog::{GitHubClient, SystemGit};
use crate::error::Result;
use crate::pipeline::Preparer;

use super::dispatcher::{Command, CommandResult, RelayContext};

/// The prepare command implementation.
pub struct PrepareCommand {
    context: RelayContext,
}

impl PrepareCommand {
    pub fn new(context: RelayContext) -> Self {
        Self { context }
    }
}

impl Command for PrepareCommand {
    fn execute(&self) -> Result<CommandResult> {
        let RelayContext { env, config } = &self.context;
        let host = GitHubClient::new(&config.api_base, env)?;
        let git = SystemGit::new(&env.workspace);

        let run = Preparer::new(config, &env.workspace, &host, &git).run()?;
        tracing::info!(
            "Prepared {} releases ({})",
            run.manifest.len(),
            run.report.summary()
        );
        Ok(CommandResult::success())
    }
}
