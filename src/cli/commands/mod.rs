//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which validates the
//! environment, loads the pipeline config once, and routes each subcommand
//! to its implementation.

pub mod build;
pub mod dispatcher;
pub mod prepare;
pub mod registry;
pub mod status;

pub use dispatcher::{Command, CommandDispatcher, CommandResult, RelayContext};
