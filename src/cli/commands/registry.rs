//! Registry command implementation.

use crate::catalog::GitHubClient;
use crate::error::Result;
use crate::pipeline::RegistryGenerator;

use super::dispatcher::{Command, CommandResult, RelayContext};

/// The registry command implementation.
pub struct RegistryCommand {
    context: RelayContext,
}

impl RegistryCommand {
    pub fn new(context: RelayContext) -> Self {
        Self { context }
    }
}

impl Command for RegistryCommand {
    fn execute(&self) -> Result<CommandResult> {
        let RelayContext { env, config } = &self.context;
        let host = GitHubClient::new(&config.api_base, env)?;

        RegistryGenerator::new(config, &env.workspace, &host).run()?;
        Ok(CommandResult::success())
    }
}
