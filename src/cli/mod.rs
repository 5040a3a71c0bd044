//! Command-line interface for release-relay.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{BuildArgs, Cli, Commands};
pub use commands::{Command, CommandDispatcher, CommandResult, RelayContext};
