//! External command execution.
//!
//! Build tools and `git` are run directly (no intermediate shell), so
//! arguments never need quoting.

use crate::error::{RelayError, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Result of executing a command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,
}

/// Options for command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Working directory.
    pub cwd: Option<PathBuf>,
}

/// Render a program and its arguments the way it is logged.
pub fn display_command(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Execute a program with arguments, streaming its output to ours.
///
/// Only a failure to start the process is an error; a non-zero exit is
/// reported through [`CommandResult::success`].
pub fn execute(program: &str, args: &[&str], options: &CommandOptions) -> Result<CommandResult> {
    let start = Instant::now();

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }

    let status = cmd.status().map_err(|e| {
        tracing::debug!("Failed to start {}: {}", program, e);
        RelayError::CommandFailed {
            command: display_command(program, args),
            code: None,
        }
    })?;

    Ok(CommandResult {
        exit_code: status.code(),
        duration: start.elapsed(),
        success: status.success(),
    })
}

/// Run a program in `cwd`, streaming its output, and fail on non-zero exit.
pub fn run_checked(program: &str, args: &[&str], cwd: &Path) -> Result<()> {
    let command = display_command(program, args);
    tracing::info!("> {}", command);

    let options = CommandOptions {
        cwd: Some(cwd.to_path_buf()),
    };
    let result = execute(program, args, &options)?;
    tracing::debug!("{} finished in {:?}", command, result.duration);

    if result.success {
        Ok(())
    } else {
        Err(RelayError::CommandFailed {
            command,
            code: result.exit_code,
        })
    }
}
