//! Process environment handling.
//!
//! Every stage needs the same three values from the CI environment. They are
//! read once into a [`ReleaseEnv`] and passed down explicitly, so no other
//! module touches `std::env`.

use crate::error::{RelayError, Result};
use std::fmt;
use std::path::PathBuf;

/// Access token for the release host.
pub const TOKEN_VAR: &str = "GITHUB_TOKEN";

/// Repository identity as `owner/name`.
pub const REPOSITORY_VAR: &str = "GITHUB_REPOSITORY";

/// Workspace root all package paths are relative to.
pub const WORKSPACE_VAR: &str = "GITHUB_WORKSPACE";

/// Configuration taken from the environment at start-up.
#[derive(Clone, PartialEq, Eq)]
pub struct ReleaseEnv {
    pub token: String,
    pub owner: String,
    pub repo: String,
    pub workspace: PathBuf,
}

impl ReleaseEnv {
    /// Build from an arbitrary variable lookup.
    ///
    /// Missing or empty variables and a repository that is not exactly
    /// `owner/name` are configuration errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &str| -> Result<String> {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| RelayError::MissingEnv {
                    name: name.to_string(),
                })
        };

        let token = require(TOKEN_VAR)?;
        let repository = require(REPOSITORY_VAR)?;
        let (owner, repo) = split_repository(&repository)?;
        let workspace = PathBuf::from(require(WORKSPACE_VAR)?);

        Ok(Self {
            token,
            owner,
            repo,
            workspace,
        })
    }
}

impl fmt::Debug for ReleaseEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleaseEnv")
            .field("token", &"***")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("workspace", &self.workspace)
            .finish()
    }
}

fn split_repository(value: &str) -> Result<(String, String)> {
    let invalid = || RelayError::InvalidRepository {
        value: value.to_string(),
    };

    let (owner, repo) = value.trim().split_once('/').ok_or_else(invalid)?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return Err(invalid());
    }
    Ok((owner.to_string(), repo.to_string()))
}
