//! Build command implementation.
//!
//! The `release-relay build --platform <name>` command runs stage 2 for one
//! platform.

use crate::catalog::GitHubClient;
use crate::cli::args::BuildArgs;
use crate::error::Result;
use crate::pipeline::{Builder, SystemRunner};

use super::dispatcher::{Command, CommandResult, RelayContext};

/// The build command implementation.
pub struct BuildCommand {
    context: RelayContext,
    args: BuildArgs,
}

impl BuildCommand {
    pub fn new(context: RelayContext, args: BuildArgs) -> Self {
        Self { context, args }
    }
}

impl Command for BuildCommand {
    fn execute(&self) -> Result<CommandResult> {
        let RelayContext { env, config } = &self.context;
        let host = GitHubClient::new(&config.api_base, env)?;

        let report = Builder::new(config, &env.workspace, &host, &SystemRunner)
            .run(self.args.platform)?;
        for unit in report.failed() {
            tracing::warn!("{} was not uploaded on {}", unit.id, self.args.platform);
        }
        Ok(CommandResult::success())
    }
}
